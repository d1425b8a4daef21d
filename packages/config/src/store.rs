//! The config store.
//!
//! Holds the live value tree commands read and write. Keys are top-level
//! names; a nested value can be reached with a slash-separated path:
//!
//! - `task` - The value stored under "task"
//! - `task/tasklist/name` - Navigate into map keys and instance properties
//! - `history/0` - Index into an array

use std::sync::Arc;

use teamwork_model::{json_to_value, value_to_json, Record, Taggable, Value};

use crate::error::ConfigError;
use crate::registry::TypeRegistry;

/// A key/value tree plus the registry used to pack and unpack it.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    registry: Arc<TypeRegistry>,
    values: Record,
}

impl ConfigStore {
    /// Create an empty store.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            values: Record::new(),
        }
    }

    /// Build a store from a packed tree, unpacking every tagged record.
    ///
    /// `Null` and `Undefined` give an empty store. Any other non-map root
    /// is rejected.
    pub fn from_packed(registry: Arc<TypeRegistry>, packed: Value) -> Result<Self, ConfigError> {
        let values = match registry.unpack(packed)? {
            Value::Map(values) => values,
            Value::Null | Value::Undefined => Record::new(),
            other => {
                return Err(ConfigError::MalformedRoot {
                    found: other.kind(),
                })
            }
        };
        Ok(Self { registry, values })
    }

    /// Build a store from a decoded JSON document.
    pub fn from_json(
        registry: Arc<TypeRegistry>,
        json: serde_json::Value,
    ) -> Result<Self, ConfigError> {
        Self::from_packed(registry, json_to_value(json))
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The value under `key`, downcast to a concrete type.
    pub fn get_as<T: Taggable>(&self, key: &str) -> Option<&T> {
        self.get(key)?.downcast_ref()
    }

    /// Navigate a slash-separated path through maps, instance properties
    /// and array indexes.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let mut components = path.split('/').filter(|c| !c.is_empty());
        let mut current = self.values.get(components.next()?)?.clone();
        for component in components {
            current = match current {
                Value::Array(items) => {
                    let index: usize = component.parse().ok()?;
                    items.into_iter().nth(index)?
                }
                other => other.property(component)?,
            };
        }
        Some(current)
    }

    /// Store a value, returning the one it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Store every entry of a map.
    pub fn set_all(&mut self, values: Record) {
        self.values.extend(values);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn pack(&self, value: &Value) -> Result<Value, ConfigError> {
        self.registry.pack(value)
    }

    pub fn unpack(&self, value: Value) -> Result<Value, ConfigError> {
        self.registry.unpack(value)
    }

    /// The whole store in packed form.
    pub fn to_packed(&self) -> Result<Value, ConfigError> {
        self.registry.pack(&Value::Map(self.values.clone()))
    }

    /// The whole store as a JSON document, ready to be written.
    pub fn to_json(&self) -> Result<serde_json::Value, ConfigError> {
        Ok(value_to_json(&self.to_packed()?)?)
    }
}
