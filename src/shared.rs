//! Shared sessions across subdomains
//!
//! A [`SharedSessionClient`] wraps an [`OAuthClient`] and ties its persisted
//! OAuth data to a shared session id carried in a signed cookie,
//! `fbss_<app_id>`, scoped to the base domain. Every subdomain that presents
//! the cookie sees the same data, even when each has its own visitor session
//! cookie.
//!
//! Construction runs the bootstrap:
//!
//! 1. a cookie that verifies, names a domain covering the request host and
//!    carries an id is adopted, and the persisted `state` is reloaded into
//!    the client;
//! 2. anything else (no cookie, bad signature, foreign domain) mints a new id
//!    and stages a fresh cookie.
//!
//! Data is then stored through `RestrictedStorage -> ScopedStorage -> S`, so
//! only the OAuth keys are accepted and every key is prefixed with the
//! shared session id.

use salvo_core::http::cookie::time::{Duration, OffsetDateTime};
use salvo_core::http::cookie::Cookie;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::OAuthClient;
use crate::config::SharedSessionConfig;
use crate::cookies::ResponseCookies;
use crate::domain::is_allowed_domain;
use crate::error::SessionError;
use crate::logger::{Logger, TracingLogger};
use crate::signed_request::SignedPayload;
use crate::storage::{PersistentStorage, RestrictedStorage, ScopedStorage};

const COOKIE_NOT_SET: &str = "Shared session ID cookie could not be set! You must ensure you \
     create the shared session client before headers have been sent. This will cause \
     authentication issues after the first request.";

const COOKIE_NOT_DELETED: &str = "Shared session ID cookie could not be deleted! Headers were \
     already sent, the browser keeps the old cookie.";

/// How the shared session id was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The request carried a valid cookie and its id was adopted
    Adopted,
    /// A new id was minted and its cookie staged
    Minted,
    /// A new id was minted but the cookie could not be written; the session
    /// only lasts for this request
    MintedWithoutCookie,
}

/// OAuth client bound to a shared session
pub struct SharedSessionClient<C, S> {
    client: C,
    storage: RestrictedStorage<ScopedStorage<S>>,
    shared_session_id: String,
    outcome: BootstrapOutcome,
    cookie_name: String,
    base_domain: String,
    cookies: ResponseCookies,
    config: SharedSessionConfig,
    logger: Arc<dyn Logger>,
}

impl<C: OAuthClient, S: PersistentStorage> SharedSessionClient<C, S> {
    /// Run the bootstrap, logging through `tracing`
    pub fn bootstrap(
        client: C,
        storage: S,
        cookies: ResponseCookies,
        config: SharedSessionConfig,
    ) -> Self {
        Self::bootstrap_with_logger(client, storage, cookies, config, Arc::new(TracingLogger))
    }

    /// Run the bootstrap with an explicit logger, also used for rejected
    /// storage keys
    pub fn bootstrap_with_logger(
        client: C,
        storage: S,
        cookies: ResponseCookies,
        config: SharedSessionConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let cookie_name = config.cookie_name(client.app_id());
        let base_domain = client.base_domain();

        let adopted = match cookies.get(&cookie_name) {
            Some(value) => match verify_cookie(&client, &value) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::debug!(cookie = %cookie_name, error = %e, "ignoring shared session cookie");
                    None
                }
            },
            None => None,
        };

        let (shared_session_id, outcome) = match adopted {
            Some(id) => (id, BootstrapOutcome::Adopted),
            None => (Uuid::new_v4().simple().to_string(), BootstrapOutcome::Minted),
        };

        let storage = RestrictedStorage::with_logger(
            ScopedStorage::new(storage, &shared_session_id),
            logger.clone(),
        );

        let mut shared = Self {
            client,
            storage,
            shared_session_id,
            outcome,
            cookie_name,
            base_domain,
            cookies,
            config,
            logger,
        };

        match shared.outcome {
            BootstrapOutcome::Adopted => {
                // The client may have picked up a state from outside the
                // shared session; the persisted one wins.
                let state = shared
                    .storage
                    .get_persistent_data("state")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .filter(|s| !s.is_empty());
                shared.client.set_state(state);
                tracing::debug!(id = %shared.shared_session_id, "adopted shared session");
            }
            _ => {
                if let Err(e) = shared.write_cookie() {
                    tracing::debug!(error = %e, "shared session cookie not written");
                    shared.logger.error(COOKIE_NOT_SET);
                    shared.outcome = BootstrapOutcome::MintedWithoutCookie;
                }
                tracing::debug!(id = %shared.shared_session_id, "minted shared session");
            }
        }

        shared
    }

    fn write_cookie(&self) -> Result<(), SessionError> {
        let mut data = SignedPayload::new();
        data.insert("domain".to_string(), Value::from(self.base_domain.as_str()));
        data.insert("id".to_string(), Value::from(self.shared_session_id.as_str()));
        let value = self.client.make_signed_request(data)?;

        let max_age = Duration::seconds(self.config.max_age as i64);
        let cookie = self
            .cookie_builder(value)
            .max_age(max_age)
            .expires(OffsetDateTime::now_utc() + max_age)
            .build();
        self.cookies.set(cookie)
    }

    fn cookie_builder(&self, value: String) -> salvo_core::http::cookie::CookieBuilder<'static> {
        Cookie::build((self.cookie_name.clone(), value))
            .path(self.config.cookie_path.clone())
            .domain(format!(".{}", self.base_domain))
            .secure(self.config.cookie_secure)
            .http_only(self.config.cookie_http_only)
    }

    /// Expire the shared-session cookie in the browser
    pub fn delete_shared_session_cookie(&self) -> Result<(), SessionError> {
        let cookie = self
            .cookie_builder(String::new())
            .expires(OffsetDateTime::UNIX_EPOCH + Duration::seconds(1))
            .build();
        self.cookies.set(cookie)
    }

    pub fn shared_session_id(&self) -> &str {
        &self.shared_session_id
    }

    pub fn outcome(&self) -> BootstrapOutcome {
        self.outcome
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Current CSRF state of the wrapped client
    pub fn state(&self) -> Option<&str> {
        self.client.state()
    }

    pub fn into_parts(self) -> (C, S) {
        (self.client, self.storage.into_inner().into_inner())
    }
}

/// Check a shared-session cookie against the request and return its id
fn verify_cookie<C: OAuthClient>(client: &C, value: &str) -> Result<String, SessionError> {
    let data = client.parse_signed_request(value)?;

    let domain = data
        .get("domain")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
        .ok_or(SessionError::MissingField("domain"))?;
    if !is_allowed_domain(client.http_host(), domain) {
        return Err(SessionError::DomainMismatch {
            host: client.http_host().to_string(),
            domain: domain.to_string(),
        });
    }

    data.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or(SessionError::MissingField("id"))
}

impl<C: OAuthClient, S: PersistentStorage> PersistentStorage for SharedSessionClient<C, S> {
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self {
        self.storage.set_persistent_data(key, value);
        self
    }

    fn get_persistent_data(&self, key: &str) -> Option<Value> {
        self.storage.get_persistent_data(key)
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self {
        self.storage.clear_persistent_data(key);
        self
    }

    /// Clear the OAuth keys, then expire the shared-session cookie
    fn clear_all_persistent_data(&mut self) -> &mut Self {
        self.storage.clear_all_persistent_data();
        if let Err(e) = self.delete_shared_session_cookie() {
            tracing::debug!(error = %e, "shared session cookie not deleted");
            self.logger.error(COOKIE_NOT_DELETED);
        }
        self
    }

    fn namespace(&self) -> Option<&str> {
        self.storage.namespace()
    }

    fn set_namespace(&mut self, namespace: Option<&str>) -> &mut Self {
        self.storage.set_namespace(namespace);
        self
    }
}

impl<C: std::fmt::Debug, S: std::fmt::Debug> std::fmt::Debug for SharedSessionClient<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSessionClient")
            .field("client", &self.client)
            .field("storage", &self.storage)
            .field("shared_session_id", &self.shared_session_id)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AppClient;
    use crate::logger::testing::RecordingLogger;
    use crate::session::Session;
    use crate::storage::{MemoryStorage, SessionStorage};
    use serde_json::json;

    const APP_ID: &str = "12345";
    const SECRET: &str = "app-secret";

    fn client(host: &str) -> AppClient {
        AppClient::new(APP_ID, SECRET, host).with_base_domain("example.com")
    }

    fn minted_cookie(storage: &MemoryStorage) -> String {
        let cookies = ResponseCookies::new();
        let shared = SharedSessionClient::bootstrap(
            client("example.com"),
            storage.clone(),
            cookies.clone(),
            SharedSessionConfig::default(),
        );
        assert_eq!(shared.outcome(), BootstrapOutcome::Minted);
        cookies.outgoing()[0].value().to_string()
    }

    /// Every single-character substitution of `value`
    fn tampered(value: &str) -> Vec<String> {
        let chars: Vec<char> = value.chars().collect();
        let mut variants = Vec::new();
        for pos in 0..chars.len() {
            for sub in ['A', 'B', 'z', '0', '-', '_'] {
                if chars[pos] == sub {
                    continue;
                }
                let mut changed = chars.clone();
                changed[pos] = sub;
                variants.push(changed.into_iter().collect());
            }
        }
        variants
    }

    #[test]
    fn test_mints_cookie_without_one() {
        let cookies = ResponseCookies::new();
        let shared = SharedSessionClient::bootstrap(
            client("app.example.com"),
            MemoryStorage::new(),
            cookies.clone(),
            SharedSessionConfig::default(),
        );

        assert_eq!(shared.outcome(), BootstrapOutcome::Minted);
        assert_eq!(shared.shared_session_id().len(), 32);
        assert_eq!(shared.cookie_name(), "fbss_12345");

        let outgoing = cookies.outgoing();
        assert_eq!(outgoing.len(), 1);
        let cookie = &outgoing[0];
        assert_eq!(cookie.name(), "fbss_12345");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(
            cookie.domain().map(|d| d.trim_start_matches('.')),
            Some("example.com")
        );
        assert_eq!(
            cookie.max_age().map(|d| d.whole_seconds()),
            Some(31_556_926)
        );
        assert!(cookie.expires_datetime().unwrap() > OffsetDateTime::now_utc());

        let data = shared
            .client()
            .parse_signed_request(cookie.value())
            .unwrap();
        assert_eq!(data["domain"], json!("example.com"));
        assert_eq!(data["id"], json!(shared.shared_session_id()));

        // Later reads in the same request see the new cookie.
        assert_eq!(cookies.get("fbss_12345").as_deref(), Some(cookie.value()));
    }

    #[test]
    fn test_adopts_valid_cookie() {
        let storage = MemoryStorage::new();
        let value = minted_cookie(&storage);
        let expected = client("example.com").parse_signed_request(&value).unwrap()["id"].clone();

        for host in ["example.com", "app.example.com"] {
            let cookies = ResponseCookies::new().with_incoming("fbss_12345", &value);
            let shared = SharedSessionClient::bootstrap(
                client(host),
                storage.clone(),
                cookies.clone(),
                SharedSessionConfig::default(),
            );

            assert_eq!(shared.outcome(), BootstrapOutcome::Adopted);
            assert_eq!(json!(shared.shared_session_id()), expected);
            assert!(cookies.outgoing().is_empty());
        }
    }

    #[test]
    fn test_tampered_cookie_mints_new_id() {
        let storage = MemoryStorage::new();
        let value = minted_cookie(&storage);
        let original = client("example.com").parse_signed_request(&value).unwrap()["id"].clone();

        let variants = tampered(&value);
        let signature_len = value.find('.').unwrap();
        assert!(variants.len() > signature_len * 5);

        for variant in variants {
            let cookies = ResponseCookies::new().with_incoming("fbss_12345", &variant);
            let shared = SharedSessionClient::bootstrap(
                client("example.com"),
                storage.clone(),
                cookies.clone(),
                SharedSessionConfig::default(),
            );

            assert_eq!(shared.outcome(), BootstrapOutcome::Minted, "adopted {}", variant);
            assert_ne!(json!(shared.shared_session_id()), original);
            assert_eq!(cookies.outgoing().len(), 1);
        }
    }

    #[test]
    fn test_foreign_domain_mints_new_id() {
        let evil = AppClient::new(APP_ID, SECRET, "evil.com");
        let mut data = SignedPayload::new();
        data.insert("domain".to_string(), json!("evil.com"));
        data.insert("id".to_string(), json!("attacker-id"));
        let value = evil.make_signed_request(data).unwrap();

        let cookies = ResponseCookies::new().with_incoming("fbss_12345", &value);
        let shared = SharedSessionClient::bootstrap(
            AppClient::new(APP_ID, SECRET, "notevil.com"),
            MemoryStorage::new(),
            cookies,
            SharedSessionConfig::default(),
        );

        assert_eq!(shared.outcome(), BootstrapOutcome::Minted);
        assert_ne!(shared.shared_session_id(), "attacker-id");
    }

    #[test]
    fn test_cookie_without_domain_is_rejected() {
        let c = client("example.com");
        let mut data = SignedPayload::new();
        data.insert("id".to_string(), json!("some-id"));
        let value = c.make_signed_request(data).unwrap();

        let cookies = ResponseCookies::new().with_incoming("fbss_12345", &value);
        let shared = SharedSessionClient::bootstrap(
            c,
            MemoryStorage::new(),
            cookies,
            SharedSessionConfig::default(),
        );
        assert_eq!(shared.outcome(), BootstrapOutcome::Minted);
        assert_ne!(shared.shared_session_id(), "some-id");
    }

    #[test]
    fn test_adopting_reloads_state() {
        let storage = MemoryStorage::new();
        let value = minted_cookie(&storage);

        let mut first = SharedSessionClient::bootstrap(
            client("example.com"),
            storage.clone(),
            ResponseCookies::new().with_incoming("fbss_12345", &value),
            SharedSessionConfig::default(),
        );
        first.set_persistent_data("state", json!("csrf-token"));

        let second = SharedSessionClient::bootstrap(
            client("app.example.com").with_state("stale"),
            storage.clone(),
            ResponseCookies::new().with_incoming("fbss_12345", &value),
            SharedSessionConfig::default(),
        );
        assert_eq!(second.state(), Some("csrf-token"));

        first.clear_persistent_data("state");
        let third = SharedSessionClient::bootstrap(
            client("example.com").with_state("stale"),
            storage,
            ResponseCookies::new().with_incoming("fbss_12345", &value),
            SharedSessionConfig::default(),
        );
        assert_eq!(third.state(), None);
    }

    #[test]
    fn test_minting_keeps_client_state() {
        let shared = SharedSessionClient::bootstrap(
            client("example.com").with_state("fresh"),
            MemoryStorage::new(),
            ResponseCookies::new(),
            SharedSessionConfig::default(),
        );
        assert_eq!(shared.state(), Some("fresh"));
    }

    #[test]
    fn test_headers_sent_degrades() {
        let cookies = ResponseCookies::new();
        cookies.seal();
        let logger = Arc::new(RecordingLogger::default());

        let shared = SharedSessionClient::bootstrap_with_logger(
            client("example.com"),
            MemoryStorage::new(),
            cookies.clone(),
            SharedSessionConfig::default(),
            logger.clone(),
        );

        assert_eq!(shared.outcome(), BootstrapOutcome::MintedWithoutCookie);
        assert_eq!(shared.shared_session_id().len(), 32);
        assert!(cookies.outgoing().is_empty());
        let messages = logger.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("could not be set"));
    }

    #[test]
    fn test_keys_are_scoped_by_shared_id() {
        let session = Session::detached();
        let mut shared = SharedSessionClient::bootstrap(
            client("example.com"),
            SessionStorage::new(session.clone()).with_namespace("fb_12345"),
            ResponseCookies::new(),
            SharedSessionConfig::default(),
        );
        shared.set_persistent_data("access_token", json!("token"));

        let key = format!("{}_access_token", shared.shared_session_id());
        let container = session.get("fb_12345").unwrap();
        assert_eq!(container[&key], json!("token"));
        assert_eq!(container.as_object().unwrap().len(), 1);
        assert_eq!(shared.get_persistent_data("access_token"), Some(json!("token")));
        assert_eq!(shared.namespace(), Some("fb_12345"));
    }

    #[test]
    fn test_unsupported_keys_are_rejected() {
        let logger = Arc::new(RecordingLogger::default());
        let storage = MemoryStorage::new();
        let mut shared = SharedSessionClient::bootstrap_with_logger(
            client("example.com"),
            storage.clone(),
            ResponseCookies::new(),
            SharedSessionConfig::default(),
            logger.clone(),
        );

        shared.set_persistent_data("evil", json!(1));
        assert!(storage.is_empty());
        assert_eq!(shared.get_persistent_data_or("evil", json!("D")), json!("D"));
        assert_eq!(logger.messages().len(), 2);
    }

    #[test]
    fn test_clear_all_deletes_cookie() {
        let storage = MemoryStorage::new();
        let cookies = ResponseCookies::new();
        let mut shared = SharedSessionClient::bootstrap(
            client("example.com"),
            storage.clone(),
            cookies.clone(),
            SharedSessionConfig::default(),
        );
        shared
            .set_persistent_data("access_token", json!("token"))
            .set_persistent_data("user_id", json!("42"));

        shared.clear_all_persistent_data();
        assert!(storage.is_empty());

        let outgoing = cookies.outgoing();
        assert_eq!(outgoing.len(), 1);
        let cookie = &outgoing[0];
        assert_eq!(cookie.name(), "fbss_12345");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.expires_datetime().unwrap() < OffsetDateTime::now_utc());
        assert_eq!(cookies.get("fbss_12345"), None);
    }

    #[test]
    fn test_clear_all_after_headers_sent_logs() {
        let storage = MemoryStorage::new();
        let cookies = ResponseCookies::new();
        let logger = Arc::new(RecordingLogger::default());
        let mut shared = SharedSessionClient::bootstrap_with_logger(
            client("example.com"),
            storage.clone(),
            cookies.clone(),
            SharedSessionConfig::default(),
            logger.clone(),
        );
        shared.set_persistent_data("access_token", json!("token"));
        cookies.seal();

        shared.clear_all_persistent_data();
        assert!(storage.is_empty());
        assert!(cookies.outgoing().is_empty());
        let messages = logger.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("could not be deleted"));
    }
}
