//! Allow-list decorator

use serde_json::Value;
use std::sync::Arc;

use super::PersistentStorage;
use crate::error::SessionError;
use crate::logger::{self, Logger};

/// The only keys OAuth state may be persisted under
pub const SUPPORTED_KEYS: [&str; 4] = ["state", "code", "access_token", "user_id"];

/// Storage wrapper that only lets [`SUPPORTED_KEYS`] through
///
/// Any other key is logged as an error and the call does nothing: writes and
/// clears are dropped, reads report the key as absent without reaching the
/// wrapped storage.
pub struct RestrictedStorage<S> {
    storage: S,
    logger: Arc<dyn Logger>,
}

impl<S: PersistentStorage> RestrictedStorage<S> {
    /// Wrap `storage`, discarding rejection logs
    pub fn new(storage: S) -> Self {
        Self::with_logger(storage, logger::null())
    }

    pub fn with_logger(storage: S, logger: Arc<dyn Logger>) -> Self {
        Self { storage, logger }
    }

    pub fn inner(&self) -> &S {
        &self.storage
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn allows(&self, key: &str, operation: &str) -> bool {
        if SUPPORTED_KEYS.contains(&key) {
            return true;
        }
        self.logger.error(&format!(
            "{} passed to {}.",
            SessionError::UnsupportedKey(key.to_string()),
            operation
        ));
        false
    }
}

impl<S: PersistentStorage> PersistentStorage for RestrictedStorage<S> {
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self {
        if self.allows(key, "set_persistent_data") {
            self.storage.set_persistent_data(key, value);
        }
        self
    }

    fn get_persistent_data(&self, key: &str) -> Option<Value> {
        if !self.allows(key, "get_persistent_data") {
            return None;
        }
        self.storage.get_persistent_data(key)
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self {
        if self.allows(key, "clear_persistent_data") {
            self.storage.clear_persistent_data(key);
        }
        self
    }

    // Key by key, so whatever else the wrapped storage holds survives.
    fn clear_all_persistent_data(&mut self) -> &mut Self {
        for key in SUPPORTED_KEYS {
            self.storage.clear_persistent_data(key);
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

impl<S: std::fmt::Debug> std::fmt::Debug for RestrictedStorage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictedStorage")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
