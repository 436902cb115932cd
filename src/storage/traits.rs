//! Persistent storage trait

use serde_json::Value;

/// Namespaced key/value persistence for OAuth state
///
/// Mutators return the storage so calls can be chained. A missing key is
/// never an error: reads return `None`, clears do nothing.
pub trait PersistentStorage {
    /// Store `value` under `key` so later reads, possibly in another
    /// request, return it.
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self;

    fn get_persistent_data(&self, key: &str) -> Option<Value>;

    /// Like [`get_persistent_data`](Self::get_persistent_data), falling back
    /// to `default` when the key is absent.
    fn get_persistent_data_or(&self, key: &str, default: Value) -> Value {
        self.get_persistent_data(key).unwrap_or(default)
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self;

    /// Clear everything this storage is responsible for
    fn clear_all_persistent_data(&mut self) -> &mut Self;

    fn namespace(&self) -> Option<&str>;

    /// Switch namespace. `None` and `""` both mean the top level.
    fn set_namespace(&mut self, namespace: Option<&str>) -> &mut Self;
}
