//! Redis session store
//!
//! Keys are `prefix + session_id`, values are the JSON form of
//! [`SessionData`], and the Redis TTL follows the session expiry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::SessionStore;
use crate::error::SessionError;
use crate::session::SessionData;

/// Redis session store
///
/// ```rust,ignore
/// use salvo_shared_session::RedisStore;
///
/// let store = RedisStore::from_url("redis://127.0.0.1/").await?;
/// ```
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
    default_ttl: u64,
}

impl RedisStore {
    /// Create a store with prefix `sess:` and a one-day default TTL
    pub async fn new(client: redis::Client) -> Result<Self, SessionError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::from_connection_manager(conn))
    }

    pub async fn from_url(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url).map_err(|e| {
            SessionError::StoreError(format!("Failed to create Redis client: {}", e))
        })?;
        Self::new(client).await
    }

    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self {
            conn,
            prefix: "sess:".to_string(),
            default_ttl: 86400,
        }
    }

    /// Build with a custom key prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// TTL used for sessions without an expiry (default: one day)
    pub fn with_default_ttl(mut self, ttl: u64) -> Self {
        self.default_ttl = ttl;
        self
    }

    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let mut conn = self.conn.clone();
        let json: Option<String> = conn.get(self.make_key(sid)).await?;

        match json {
            Some(json) => {
                let session: SessionData = serde_json::from_str(&json)?;
                Ok((!session.is_expired()).then_some(session))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        sid: &str,
        session: &SessionData,
        ttl_secs: Option<u64>,
    ) -> Result<(), SessionError> {
        let key = self.make_key(sid);
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(session)?;

        match ttl_secs.unwrap_or(self.default_ttl) {
            0 => conn.del::<_, ()>(&key).await?,
            ttl => conn.set_ex::<_, _, ()>(&key, &json, ttl).await?,
        }
        Ok(())
    }
}
