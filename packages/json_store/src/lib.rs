//! Persistence for the packed config tree.
//!
//! The config layer hands over a plain JSON document; this crate decides
//! where it lives:
//! - `JsonFileStore`: One pretty-printed JSON file at a per-user path
//! - `InMemoryStore`: A document held in memory, for tests and dry runs

pub mod error;
pub mod in_memory;
pub mod local_disk;

use serde_json::Value as JsonValue;

pub use error::Error;
pub use in_memory::InMemoryStore;
pub use local_disk::{default_path, JsonFileStore, CONFIG_ENV, CONFIG_FILE_NAME};

/// Somewhere a whole JSON document can be loaded from and saved to.
pub trait DocumentStore {
    /// The stored document, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<JsonValue>, Error>;

    /// Replace the stored document.
    fn save(&mut self, document: &JsonValue) -> Result<(), Error>;

    /// Forget the stored document. Returns whether there was one.
    fn delete(&mut self) -> Result<bool, Error>;
}
