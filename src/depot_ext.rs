//! Extension trait for Depot to reach the per-request handles

use salvo_core::Depot;

use crate::cookies::ResponseCookies;
use crate::handler::{COOKIES_KEY, SESSION_KEY};
use crate::session::Session;
use crate::storage::SessionStorage;

/// Access to what [`SessionHandler`](crate::SessionHandler) put in the depot
pub trait SessionDepotExt {
    fn session(&self) -> Option<&Session>;

    /// A handle sharing state with the middleware's session
    fn session_mut(&mut self) -> Option<Session>;

    /// The cookie jar of the current request
    fn response_cookies(&self) -> Option<ResponseCookies>;

    /// Persistent storage over the visitor session
    fn session_storage(&self) -> Option<SessionStorage> {
        self.session().cloned().map(SessionStorage::new)
    }
}

impl SessionDepotExt for Depot {
    fn session(&self) -> Option<&Session> {
        self.get::<Session>(SESSION_KEY).ok()
    }

    fn session_mut(&mut self) -> Option<Session> {
        self.get::<Session>(SESSION_KEY).ok().cloned()
    }

    fn response_cookies(&self) -> Option<ResponseCookies> {
        self.get::<ResponseCookies>(COOKIES_KEY).ok().cloned()
    }
}
