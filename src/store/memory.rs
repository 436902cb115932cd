//! In-memory session store
//!
//! Meant for development and tests; sessions vanish on restart and are not
//! shared between processes.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::SessionStore;
use crate::error::SessionError;
use crate::session::SessionData;

struct StoredSession {
    data: SessionData,
    expires_at: Option<Instant>,
}

impl StoredSession {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |exp| exp > now)
    }
}

/// In-memory session store
#[derive(Clone)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    prefix: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_prefix("sess:")
    }

    /// Create a store with a custom key prefix
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            prefix: prefix.into(),
        }
    }

    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.prefix, sid)
    }

    /// Drop expired sessions
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.sessions.write().retain(|_, stored| stored.is_live(now));
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.cleanup_expired();
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read();
        Ok(sessions
            .get(&self.make_key(sid))
            .filter(|stored| stored.is_live(Instant::now()))
            .map(|stored| stored.data.clone()))
    }

    async fn set(
        &self,
        sid: &str,
        session: &SessionData,
        ttl_secs: Option<u64>,
    ) -> Result<(), SessionError> {
        let stored = StoredSession {
            data: session.clone(),
            expires_at: ttl_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
        };
        self.sessions.write().insert(self.make_key(sid), stored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();

        let mut data = SessionData::new(Some(3600));
        data.set("access_token", "token");
        store.set("test-id", &data, Some(3600)).await.unwrap();

        let retrieved = store.get("test-id").await.unwrap().unwrap();
        assert_eq!(
            retrieved.get::<String>("access_token"),
            Some("token".to_string())
        );
        assert_eq!(store.len(), 1);
        assert!(store.get("other-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_expiry() {
        let store = MemoryStore::new();
        store
            .set("test-id", &SessionData::new(None), Some(0))
            .await
            .unwrap();

        assert!(store.get("test-id").await.unwrap().is_none());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_sessions() {
        let store = MemoryStore::with_prefix("oauth:");
        let other = store.clone();
        store
            .set("sid", &SessionData::new(None), None)
            .await
            .unwrap();
        assert!(other.get("sid").await.unwrap().is_some());
    }
}
