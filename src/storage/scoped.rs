//! Key-prefixing decorator

use serde_json::Value;

use super::PersistentStorage;

/// Prefixes every key with `<scope>_` before delegating
///
/// Used to keep the data of different shared sessions apart when they land
/// in the same backing session.
#[derive(Debug, Clone)]
pub struct ScopedStorage<S> {
    storage: S,
    prefix: String,
}

impl<S: PersistentStorage> ScopedStorage<S> {
    pub fn new(storage: S, scope: &str) -> Self {
        Self {
            storage,
            prefix: format!("{}_", scope),
        }
    }

    /// The key actually used in the wrapped storage
    pub fn scoped_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn inner(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: PersistentStorage> PersistentStorage for ScopedStorage<S> {
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self {
        let key = self.scoped_key(key);
        self.storage.set_persistent_data(&key, value);
        self
    }

    fn get_persistent_data(&self, key: &str) -> Option<Value> {
        self.storage.get_persistent_data(&self.scoped_key(key))
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self {
        let key = self.scoped_key(key);
        self.storage.clear_persistent_data(&key);
        self
    }

    // The wrapped storage cannot list keys, so this clears it entirely,
    // other scopes included.
    fn clear_all_persistent_data(&mut self) -> &mut Self {
        self.storage.clear_all_persistent_data();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    #[test]
    fn test_keys_are_prefixed() {
        let mut storage = ScopedStorage::new(MemoryStorage::new(), "abc");
        storage.set_persistent_data("state", json!("s"));

        assert_eq!(storage.get_persistent_data("state"), Some(json!("s")));
        assert_eq!(storage.inner().get_persistent_data("abc_state"), Some(json!("s")));
        assert_eq!(storage.inner().get_persistent_data("state"), None);
    }

    #[test]
    fn test_scopes_do_not_collide() {
        let backing = MemoryStorage::new();
        let mut first = ScopedStorage::new(backing.clone(), "one");
        let mut second = ScopedStorage::new(backing, "two");

        first.set_persistent_data("code", json!(1));
        second.set_persistent_data("code", json!(2));
        assert_eq!(first.get_persistent_data("code"), Some(json!(1)));
        assert_eq!(second.get_persistent_data("code"), Some(json!(2)));

        first.clear_persistent_data("code");
        assert_eq!(second.get_persistent_data("code"), Some(json!(2)));
    }
}
