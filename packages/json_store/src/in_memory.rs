//! In-memory document store.

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::DocumentStore;

/// A document held in memory.
///
/// # Example
///
/// ```rust
/// use teamwork_json_store::{DocumentStore, InMemoryStore};
///
/// let mut store = InMemoryStore::new();
/// assert_eq!(store.load().unwrap(), None);
///
/// store.save(&serde_json::json!({"installation": "acme"})).unwrap();
/// assert!(store.load().unwrap().is_some());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    document: Option<JsonValue>,
    saves: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an already-saved document.
    pub fn with_document(document: JsonValue) -> Self {
        Self {
            document: Some(document),
            saves: 0,
        }
    }

    pub fn document(&self) -> Option<&JsonValue> {
        self.document.as_ref()
    }

    /// How many times `save` has been called.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self) -> Result<Option<JsonValue>, Error> {
        Ok(self.document.clone())
    }

    fn save(&mut self, document: &JsonValue) -> Result<(), Error> {
        self.document = Some(document.clone());
        self.saves += 1;
        Ok(())
    }

    fn delete(&mut self) -> Result<bool, Error> {
        Ok(self.document.take().is_some())
    }
}
