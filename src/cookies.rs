//! Request-scoped cookie jar
//!
//! [`ResponseCookies`] holds the cookie values the request arrived with and
//! the cookies staged for the response. The middleware flushes staged
//! cookies into the Salvo response and then seals the jar; a sealed jar
//! refuses new cookies the way a server refuses headers once they are sent.

use parking_lot::Mutex;
use salvo_core::http::cookie::Cookie;
use salvo_core::http::Request;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SessionError;

#[derive(Debug, Default)]
struct Jar {
    incoming: HashMap<String, String>,
    outgoing: Vec<Cookie<'static>>,
    sealed: bool,
}

/// Cloneable handle to the cookies of one request/response cycle
#[derive(Debug, Clone, Default)]
pub struct ResponseCookies {
    jar: Arc<Mutex<Jar>>,
}

impl ResponseCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the cookies sent with `req`
    pub fn from_request(req: &Request) -> Self {
        let incoming = req
            .cookies()
            .iter()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        Self {
            jar: Arc::new(Mutex::new(Jar {
                incoming,
                ..Default::default()
            })),
        }
    }

    /// Add an incoming cookie value
    pub fn with_incoming(self, name: &str, value: &str) -> Self {
        self.jar
            .lock()
            .incoming
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Value of a cookie as seen by this request, including cookies set
    /// earlier in the same request
    pub fn get(&self, name: &str) -> Option<String> {
        self.jar.lock().incoming.get(name).cloned()
    }

    /// Stage `cookie` for the response.
    ///
    /// The request-side view is updated even when the jar is sealed; an empty
    /// value removes the cookie from it.
    pub fn set(&self, cookie: Cookie<'static>) -> Result<(), SessionError> {
        let mut jar = self.jar.lock();

        if cookie.value().is_empty() {
            jar.incoming.remove(cookie.name());
        } else {
            jar.incoming
                .insert(cookie.name().to_string(), cookie.value().to_string());
        }

        if jar.sealed {
            return Err(SessionError::HeadersAlreadySent);
        }
        jar.outgoing.retain(|c| c.name() != cookie.name());
        jar.outgoing.push(cookie);
        Ok(())
    }

    /// Cookies staged so far
    pub fn outgoing(&self) -> Vec<Cookie<'static>> {
        self.jar.lock().outgoing.clone()
    }

    pub fn is_sealed(&self) -> bool {
        self.jar.lock().sealed
    }

    /// Seal the jar and hand back the staged cookies
    pub fn seal(&self) -> Vec<Cookie<'static>> {
        let mut jar = self.jar.lock();
        jar.sealed = true;
        std::mem::take(&mut jar.outgoing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_updates_request_view() {
        let cookies = ResponseCookies::new().with_incoming("a", "1");
        assert_eq!(cookies.get("a"), Some("1".to_string()));

        cookies.set(Cookie::new("b", "2")).unwrap();
        assert_eq!(cookies.get("b"), Some("2".to_string()));
        assert_eq!(cookies.outgoing().len(), 1);

        cookies.set(Cookie::new("a", "")).unwrap();
        assert_eq!(cookies.get("a"), None);
    }

    #[test]
    fn test_restaging_replaces_cookie() {
        let cookies = ResponseCookies::new();
        cookies.set(Cookie::new("a", "1")).unwrap();
        cookies.set(Cookie::new("a", "2")).unwrap();

        let outgoing = cookies.outgoing();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].value(), "2");
    }

    #[test]
    fn test_sealed_jar_refuses_cookies() {
        let cookies = ResponseCookies::new();
        cookies.set(Cookie::new("a", "1")).unwrap();

        let flushed = cookies.seal();
        assert_eq!(flushed.len(), 1);
        assert!(cookies.is_sealed());

        let result = cookies.set(Cookie::new("b", "2"));
        assert!(matches!(result, Err(SessionError::HeadersAlreadySent)));
        assert!(cookies.outgoing().is_empty());
        assert_eq!(cookies.get("b"), Some("2".to_string()));
    }
}
