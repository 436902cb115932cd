//! # salvo-shared-session
//!
//! Persistent OAuth state for Facebook-login style clients on Salvo, with
//! optional sharing of that state across subdomains.
//!
//! The crate is made of three layers:
//!
//! - **Visitor sessions**: [`SessionHandler`] loads a per-visitor session from
//!   a [`SessionStore`] (memory or Redis) using an express-session compatible
//!   signed cookie, and puts a [`Session`] and a [`ResponseCookies`] jar in the
//!   depot.
//! - **Persistent storage**: [`PersistentStorage`] is the key/value contract
//!   the OAuth layer writes through. [`SessionStorage`] stores into the
//!   visitor session, optionally under a namespace; [`RestrictedStorage`]
//!   only lets the OAuth keys (`state`, `code`, `access_token`, `user_id`)
//!   through.
//! - **Shared sessions**: [`SharedSessionClient`] wraps an [`OAuthClient`],
//!   and either adopts the id from a signed `fbss_<app_id>` cookie scoped to
//!   the base domain or mints a new one, then keys all persisted data by it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_shared_session::{
//!     AppClient, MemoryStore, PersistentStorage, SessionConfig, SessionDepotExt,
//!     SessionHandler, SharedSessionClient, SharedSessionConfig,
//! };
//!
//! #[handler]
//! async fn login(req: &mut Request, depot: &mut Depot) -> String {
//!     let storage = depot.session_storage().unwrap().with_namespace("fb_12345");
//!     let cookies = depot.response_cookies().unwrap();
//!     let client = AppClient::from_request("12345", "app-secret", req);
//!
//!     let mut shared =
//!         SharedSessionClient::bootstrap(client, storage, cookies, SharedSessionConfig::default());
//!     shared.set_persistent_data("state", "csrf".into());
//!     shared.shared_session_id().to_string()
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::new()
//!         .hoop(SessionHandler::new(MemoryStore::new(), SessionConfig::new("secret")))
//!         .get(login);
//!     let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
//!     Server::new(acceptor).serve(router).await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod cookie_signature;
pub mod cookies;
pub mod domain;
pub mod error;
pub mod handler;
pub mod logger;
pub mod session;
pub mod shared;
pub mod signed_request;
pub mod storage;
pub mod store;

pub use client::{AppClient, OAuthClient};
pub use config::{SameSite, SessionConfig, SharedSessionConfig};
pub use cookies::ResponseCookies;
pub use domain::is_allowed_domain;
pub use error::SessionError;
pub use handler::SessionHandler;
pub use logger::{Logger, NullLogger, TracingLogger};
pub use session::{Session, SessionData};
pub use shared::{BootstrapOutcome, SharedSessionClient};
pub use signed_request::SignedPayload;
pub use storage::{
    MemoryStorage, PersistentStorage, RestrictedStorage, ScopedStorage, SessionStorage,
    SUPPORTED_KEYS,
};
pub use store::{MemoryStore, SessionStore};

#[cfg(feature = "redis-store")]
pub use store::RedisStore;

/// Extension trait for Depot to easily access the session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
