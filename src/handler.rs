//! Visitor session middleware for Salvo
//!
//! Loads the visitor session named by the signed session cookie, exposes it
//! and a [`ResponseCookies`] jar through the depot, and after the rest of the
//! chain has run, flushes staged cookies and persists the session.

use salvo_core::http::cookie::{self, Cookie};
use salvo_core::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{SameSite, SessionConfig};
use crate::cookie_signature::{sign, unsign_with_secrets};
use crate::cookies::ResponseCookies;
use crate::session::{Session, SessionData};
use crate::store::SessionStore;

pub(crate) const SESSION_KEY: &str = "salvo.shared_session.session";
pub(crate) const COOKIES_KEY: &str = "salvo.shared_session.cookies";

/// Visitor session middleware
pub struct SessionHandler<S: SessionStore> {
    store: Arc<S>,
    config: SessionConfig,
}

impl<S: SessionStore> SessionHandler<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    fn generate_session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Session id from the request cookie, if its signature checks out
    fn session_id_from_cookie(&self, req: &Request) -> Option<String> {
        let raw = req.cookie(&self.config.cookie_name)?.value();
        let decoded = urlencoding::decode(raw)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| raw.to_string());

        unsign_with_secrets(&decoded, &self.config.secrets)
    }

    async fn load(&self, req: &Request) -> Session {
        if let Some(sid) = self.session_id_from_cookie(req) {
            match self.store.get(&sid).await {
                Ok(Some(data)) if !data.is_expired() => return Session::new(sid, data, false),
                Ok(_) => {}
                Err(e) => tracing::error!("Failed to load session: {}", e),
            }
        }
        Session::new(
            self.generate_session_id(),
            SessionData::new(self.config.max_age),
            true,
        )
    }

    fn session_cookie(&self, session_id: &str) -> Cookie<'static> {
        let signed = sign(session_id, self.config.signing_secret());

        let mut builder = Cookie::build((self.config.cookie_name.clone(), signed))
            .path(self.config.cookie_path.clone())
            .http_only(self.config.cookie_http_only)
            .secure(self.config.cookie_secure)
            .same_site(match self.config.cookie_same_site {
                SameSite::Strict => cookie::SameSite::Strict,
                SameSite::Lax => cookie::SameSite::Lax,
                SameSite::None => cookie::SameSite::None,
            });

        if let Some(domain) = self.config.cookie_domain.clone() {
            builder = builder.domain(domain);
        }
        if let Some(max_age) = self.config.max_age {
            builder = builder.max_age(cookie::time::Duration::seconds(max_age as i64));
        }

        builder.build()
    }

    /// TTL for the store, from the record's own expiry or the configured max age
    fn session_ttl(&self, data: &SessionData) -> Option<u64> {
        data.ttl_secs().or(self.config.max_age)
    }
}

impl<S: SessionStore> Clone for SessionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

#[async_trait]
impl<S: SessionStore> Handler for SessionHandler<S> {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let session = self.load(req).await;
        let cookies = ResponseCookies::from_request(req);

        depot.insert(SESSION_KEY, session.clone());
        depot.insert(COOKIES_KEY, cookies.clone());

        ctrl.call_next(req, depot, res).await;

        // Anything staged after this point is refused.
        for cookie in cookies.seal() {
            res.add_cookie(cookie);
        }

        let should_save =
            session.is_modified() || (session.is_new() && self.config.save_uninitialized);
        if !should_save {
            return;
        }

        let data = session.data();
        if let Err(e) = self
            .store
            .set(session.id(), &data, self.session_ttl(&data))
            .await
        {
            tracing::error!("Failed to save session: {}", e);
            return;
        }

        if session.is_new() {
            res.add_cookie(self.session_cookie(session.id()));
        }
    }
}
