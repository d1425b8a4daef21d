//! Typed Config Store
//!
//! Persists an arbitrary value tree, including live model instances, as
//! plain JSON and brings it back with the original types:
//! - `TypeRegistry`: Table from type name to a way of rebuilding the type
//! - `pack`/`unpack`: Recursive transforms between live and tagged trees
//! - `ConfigStore`: The key/value store commands read and write
//! - `Pattern` and the `Date` serializer: Built-ins that are not tree-shaped
//!
//! A packed instance is a map carrying its type name under `className`:
//!
//! ```json
//! {"current": {"className": "Task", "id": 5, "title": "Fix bug"}}
//! ```
//!
//! Types registered with a serializer keep their payload under `serialized`:
//!
//! ```json
//! {"since": {"className": "Date", "serialized": "2024-01-02T03:04:05Z"}}
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use teamwork_config::{ConfigStore, TypeRegistry};
//!
//! let registry = Arc::new(TypeRegistry::with_builtins());
//! let mut store = ConfigStore::new(registry);
//! store.set("installation", "acme");
//!
//! let packed = store.to_json().unwrap();
//! assert_eq!(packed, serde_json::json!({"installation": "acme"}));
//! ```

mod builtins;
mod error;
mod pack;
mod registry;
mod store;

pub use builtins::{Pattern, PatternError, PATTERN_TYPE};
pub use error::ConfigError;
pub use registry::{
    ConstructFn, DeserializeFn, FunctionFn, SerializeFn, Serializer, TypeEntry, TypeRegistry,
};
pub use store::ConfigStore;

/// Key holding the registered type name of a packed instance.
pub const CLASS_NAME: &str = "className";

/// Key holding the payload of a type packed through its serializer.
pub const SERIALIZED: &str = "serialized";
