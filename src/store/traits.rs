//! Session store trait

use async_trait::async_trait;

use crate::error::SessionError;
use crate::session::SessionData;

/// Backend holding visitor sessions between requests
///
/// Records are keyed by `prefix + session_id`, serialized as JSON by
/// backends that leave the process.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load a session, `None` when absent or expired
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError>;

    /// Insert or replace a session. `ttl_secs` of `None` stores it without
    /// expiry; a zero TTL drops it.
    async fn set(
        &self,
        sid: &str,
        session: &SessionData,
        ttl_secs: Option<u64>,
    ) -> Result<(), SessionError>;
}
