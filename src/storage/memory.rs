//! In-process storage

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::PersistentStorage;

type Partitions = HashMap<String, HashMap<String, Value>>;

/// Storage kept in process memory, partitioned by namespace
///
/// Clones share the same data. Unlike [`SessionStorage`](super::SessionStorage),
/// clearing everything only empties the current namespace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    partitions: Arc<RwLock<Partitions>>,
    namespace: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self) -> String {
        self.namespace.clone().unwrap_or_default()
    }

    /// Number of keys in the current namespace
    pub fn len(&self) -> usize {
        self.partitions
            .read()
            .get(&self.partition())
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStorage for MemoryStorage {
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self {
        self.partitions
            .write()
            .entry(self.partition())
            .or_default()
            .insert(key.to_string(), value);
        self
    }

    fn get_persistent_data(&self, key: &str) -> Option<Value> {
        self.partitions
            .read()
            .get(&self.partition())
            .and_then(|values| values.get(key))
            .cloned()
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self {
        if let Some(values) = self.partitions.write().get_mut(&self.partition()) {
            values.remove(key);
        }
        self
    }

    fn clear_all_persistent_data(&mut self) -> &mut Self {
        self.partitions.write().remove(&self.partition());
        self
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: Option<&str>) -> &mut Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self.partitions.write().entry(self.partition()).or_default();
        self
    }
}
