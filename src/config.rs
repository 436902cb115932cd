//! Session configuration

use std::time::Duration;

/// Lifetime of the shared-session cookie. The visitor session usually
/// expires well before this.
pub const SHARED_COOKIE_MAX_AGE: u64 = 31_556_926;

/// Configuration for the visitor session middleware
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Secret key(s) for signing the session cookie.
    /// The first one signs, all of them are tried when verifying.
    pub secrets: Vec<String>,

    /// Name of the session cookie (default: "oauth.sid")
    pub cookie_name: String,

    /// Cookie path (default: "/")
    pub cookie_path: String,

    /// Cookie domain (default: None - current host only)
    pub cookie_domain: Option<String>,

    /// HttpOnly flag (default: true)
    pub cookie_http_only: bool,

    /// Secure flag (default: false)
    pub cookie_secure: bool,

    /// SameSite attribute (default: Lax)
    pub cookie_same_site: SameSite,

    /// Max age in seconds, used for both the cookie and the store TTL.
    /// None makes a browser-session cookie.
    pub max_age: Option<u64>,

    /// Whether to save sessions nobody wrote to (default: false)
    pub save_uninitialized: bool,
}

/// SameSite cookie attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secrets: vec!["keyboard cat".to_string()],
            cookie_name: "oauth.sid".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_http_only: true,
            cookie_secure: false,
            cookie_same_site: SameSite::Lax,
            max_age: None,
            save_uninitialized: false,
        }
    }
}

impl SessionConfig {
    /// Create a configuration signing with `secret`
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secrets: vec![secret.into()],
            ..Default::default()
        }
    }

    /// Create a configuration with several secrets, newest first
    pub fn with_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets.into_iter().map(|s| s.into()).collect(),
            ..Default::default()
        }
    }

    pub fn with_cookie_name<S: Into<String>>(mut self, name: S) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_cookie_path<S: Into<String>>(mut self, path: S) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    /// Set max age in seconds, None for a browser-session cookie
    pub fn with_max_age(mut self, max_age: impl Into<Option<u64>>) -> Self {
        self.max_age = max_age.into();
        self
    }

    pub fn with_max_age_duration(mut self, duration: impl Into<Option<Duration>>) -> Self {
        self.max_age = duration.into().map(|d| d.as_secs());
        self
    }

    pub fn with_save_uninitialized(mut self, save: bool) -> Self {
        self.save_uninitialized = save;
        self
    }

    /// The secret new cookies are signed with
    pub fn signing_secret(&self) -> &str {
        self.secrets.first().map(String::as_str).unwrap_or_default()
    }
}

/// Configuration for the shared-session cookie
#[derive(Clone, Debug)]
pub struct SharedSessionConfig {
    /// Cookie name prefix; the app id is appended (default: "fbss")
    pub cookie_prefix: String,

    /// Cookie path (default: "/")
    pub cookie_path: String,

    /// Cookie lifetime in seconds (default: one year)
    pub max_age: u64,

    /// Secure flag (default: false)
    pub cookie_secure: bool,

    /// HttpOnly flag (default: false)
    pub cookie_http_only: bool,
}

impl Default for SharedSessionConfig {
    fn default() -> Self {
        Self {
            cookie_prefix: "fbss".to_string(),
            cookie_path: "/".to_string(),
            max_age: SHARED_COOKIE_MAX_AGE,
            cookie_secure: false,
            cookie_http_only: false,
        }
    }
}

impl SharedSessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.cookie_prefix = prefix.into();
        self
    }

    pub fn with_cookie_path<S: Into<String>>(mut self, path: S) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_max_age(mut self, max_age: u64) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    /// Cookie name for an application, so several apps can share a domain
    pub fn cookie_name(&self, app_id: &str) -> String {
        format!("{}_{}", self.cookie_prefix, app_id)
    }
}
