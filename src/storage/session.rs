//! Storage backed by the visitor session

use serde_json::{Map, Value};

use super::PersistentStorage;
use crate::session::Session;

/// Stores OAuth data in the visitor [`Session`]
///
/// Without a namespace keys live at the top level of the session. With one,
/// they live in a JSON object stored under the namespace key.
///
/// Clearing everything without a namespace empties the whole visitor
/// session, including values that other code put there.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    session: Session,
    namespace: Option<String>,
}

impl SessionStorage {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            namespace: None,
        }
    }

    /// Build with a namespace already set
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.set_namespace(Some(namespace));
        self
    }

    /// The underlying visitor session
    pub fn session(&self) -> &Session {
        &self.session
    }
}

// A namespace slot holding something other than an object is treated as
// empty and replaced with an object holding whatever `f` wrote.
fn with_container<R>(
    values: &mut Map<String, Value>,
    namespace: &str,
    f: impl FnOnce(&mut Map<String, Value>) -> R,
) -> R {
    let mut map = match values.remove(namespace) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let result = f(&mut map);
    values.insert(namespace.to_string(), Value::Object(map));
    result
}

impl PersistentStorage for SessionStorage {
    fn set_persistent_data(&mut self, key: &str, value: Value) -> &mut Self {
        match self.namespace.as_deref() {
            None => self.session.set(key, value),
            Some(ns) => self.session.update(|values| {
                with_container(values, ns, |map| map.insert(key.to_string(), value));
            }),
        }
        self
    }

    fn get_persistent_data(&self, key: &str) -> Option<Value> {
        match self.namespace.as_deref() {
            None => self.session.get(key),
            Some(ns) => self.session.inspect(|values| {
                values
                    .get(ns)
                    .and_then(Value::as_object)
                    .and_then(|map| map.get(key))
                    .cloned()
            }),
        }
    }

    fn clear_persistent_data(&mut self, key: &str) -> &mut Self {
        match self.namespace.as_deref() {
            None => {
                self.session.remove(key);
            }
            Some(ns) => {
                let present = self.session.inspect(|values| {
                    values
                        .get(ns)
                        .and_then(Value::as_object)
                        .is_some_and(|map| map.contains_key(key))
                });
                if present {
                    self.session
                        .update(|values| with_container(values, ns, |map| map.remove(key)));
                }
            }
        }
        self
    }

    fn clear_all_persistent_data(&mut self) -> &mut Self {
        match self.namespace.as_deref() {
            None => self.session.clear(),
            Some(ns) => self.session.update(|values| {
                values.insert(ns.to_string(), Value::Object(Map::new()));
            }),
        }
        self
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: Option<&str>) -> &mut Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);

        if let Some(ns) = self.namespace.as_deref() {
            if !self.session.contains(ns) {
                self.session.set(ns, Value::Object(Map::new()));
            }
        }
        self
    }
}
