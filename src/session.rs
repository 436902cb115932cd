//! Visitor session record and request-scoped handle
//!
//! This is the host key-value session the persistent storages sit on. The
//! middleware loads a [`SessionData`] from the store at the start of a
//! request, hands out a [`Session`] handle, and saves the record back when
//! the handle reports a modification.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stored form of a visitor session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Absolute expiry, `None` for a browser-session lifetime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    /// Top-level session values
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl SessionData {
    /// Create an empty record expiring after `max_age_secs`, or never
    pub fn new(max_age_secs: Option<u64>) -> Self {
        Self {
            expires: max_age_secs.map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64)),
            values: Map::new(),
        }
    }

    /// Get a typed value
    #[cfg(test)]
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value, silently skipping values that fail to serialize
    #[cfg(test)]
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), v);
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires {
            Some(exp) => exp <= Utc::now(),
            None => false,
        }
    }

    /// Seconds left before expiry, `None` when the record never expires
    pub fn ttl_secs(&self) -> Option<u64> {
        self.expires
            .map(|exp| (exp - Utc::now()).num_seconds().max(0) as u64)
    }
}

/// Shared handle to the visitor session of the current request
///
/// Clones point at the same record, so a handle taken from the depot and the
/// one kept by the middleware observe each other's writes.
#[derive(Clone)]
pub struct Session {
    id: String,
    data: Arc<RwLock<SessionData>>,
    modified: Arc<AtomicBool>,
    is_new: bool,
}

impl Session {
    pub fn new(id: String, data: SessionData, is_new: bool) -> Self {
        Self {
            id,
            data: Arc::new(RwLock::new(data)),
            modified: Arc::new(AtomicBool::new(false)),
            is_new,
        }
    }

    /// A fresh session that is not bound to any store
    pub fn detached() -> Self {
        Self::new(String::new(), SessionData::default(), true)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.read().values.get(key).cloned()
    }

    /// Set a raw value
    pub fn set(&self, key: &str, value: Value) {
        self.update(|values| {
            values.insert(key.to_string(), value);
        });
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.data.write().values.remove(key);
        if removed.is_some() {
            self.modified.store(true, Ordering::SeqCst);
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.read().values.contains_key(key)
    }

    /// Drop every value in the session
    pub fn clear(&self) {
        self.update(Map::clear);
    }

    /// Read the top-level values
    pub fn inspect<R>(&self, f: impl FnOnce(&Map<String, Value>) -> R) -> R {
        f(&self.data.read().values)
    }

    /// Mutate the top-level values and mark the session modified
    pub fn update<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        let result = f(&mut self.data.write().values);
        self.modified.store(true, Ordering::SeqCst);
        result
    }

    /// Copy of the record, for saving
    pub fn data(&self) -> SessionData {
        self.data.read().clone()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("data", &*self.data.read())
            .field("modified", &self.is_modified())
            .field("is_new", &self.is_new)
            .finish()
    }
}
