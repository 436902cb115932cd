//! OAuth client capability
//!
//! The shared-session layer needs only a small slice of an OAuth client:
//! application identity, the request host, the in-memory CSRF `state`, and
//! the ability to sign payloads with the app secret. [`OAuthClient`] is that
//! slice; [`AppClient`] is a minimal implementation of it.

use salvo_core::http::header::HOST;
use salvo_core::http::Request;

use crate::domain;
use crate::error::SessionError;
use crate::signed_request::{self, SignedPayload};

pub trait OAuthClient {
    fn app_id(&self) -> &str;

    fn app_secret(&self) -> &str;

    /// Host the current request was addressed to
    fn http_host(&self) -> &str;

    /// Domain cookies are scoped to. Defaults to the request host without
    /// its port.
    fn base_domain(&self) -> String {
        domain::host_without_port(self.http_host()).to_string()
    }

    /// CSRF state of the login flow in progress, if any
    fn state(&self) -> Option<&str>;

    fn set_state(&mut self, state: Option<String>);

    fn parse_signed_request(&self, signed: &str) -> Result<SignedPayload, SessionError> {
        signed_request::parse(signed, self.app_secret())
    }

    fn make_signed_request(&self, data: SignedPayload) -> Result<String, SessionError> {
        signed_request::make(data, self.app_secret())
    }
}

/// Application credentials plus per-request host and state
#[derive(Debug, Clone)]
pub struct AppClient {
    app_id: String,
    app_secret: String,
    http_host: String,
    base_domain: Option<String>,
    state: Option<String>,
}

impl AppClient {
    pub fn new<I, S, H>(app_id: I, app_secret: S, http_host: H) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        H: Into<String>,
    {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            http_host: http_host.into(),
            base_domain: None,
            state: None,
        }
    }

    /// Build for the host `req` was sent to, taken from the URI authority or
    /// the `Host` header, without the port.
    pub fn from_request<I, S>(app_id: I, app_secret: S, req: &Request) -> Self
    where
        I: Into<String>,
        S: Into<String>,
    {
        let host = req
            .uri()
            .host()
            .map(str::to_string)
            .or_else(|| {
                req.headers()
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(|h| domain::host_without_port(h).to_string())
            })
            .unwrap_or_default();
        Self::new(app_id, app_secret, host)
    }

    /// Scope cookies to `domain` instead of the request host
    pub fn with_base_domain<D: Into<String>>(mut self, domain: D) -> Self {
        self.base_domain = Some(domain.into());
        self
    }

    pub fn with_state<S: Into<String>>(mut self, state: S) -> Self {
        self.state = Some(state.into());
        self
    }
}

impl OAuthClient for AppClient {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn app_secret(&self) -> &str {
        &self.app_secret
    }

    fn http_host(&self) -> &str {
        &self.http_host
    }

    fn base_domain(&self) -> String {
        match &self.base_domain {
            Some(domain) => domain.clone(),
            None => domain::host_without_port(&self.http_host).to_string(),
        }
    }

    fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    fn set_state(&mut self, state: Option<String>) {
        self.state = state;
    }
}
