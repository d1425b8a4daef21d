//! The type registry.
//!
//! Maps a registered type name to the way its packed form is rebuilt. The
//! registry is an ordinary value: build it once at startup and share it with
//! every store that needs it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use teamwork_model::{construct, Descriptor, Instance, ModelType, Record, Taggable, Value};

use crate::builtins;
use crate::error::ConfigError;

/// Rebuilds a class-like type from its unpacked properties.
pub type ConstructFn = Arc<dyn Fn(Record) -> Result<Instance, ConfigError> + Send + Sync>;

/// Rebuilds a value from its unpacked properties with a plain function.
pub type FunctionFn = Arc<dyn Fn(Record) -> Result<Value, ConfigError> + Send + Sync>;

/// Turns an instance into a plain payload.
pub type SerializeFn = Arc<dyn Fn(&dyn Taggable) -> Result<Value, ConfigError> + Send + Sync>;

/// Turns a plain payload back into a value.
pub type DeserializeFn = Arc<dyn Fn(Value) -> Result<Value, ConfigError> + Send + Sync>;

/// An explicit `serialize`/`deserialize` pair for types that are not
/// tree-shaped. Both halves must be set before registration.
#[derive(Clone, Default)]
pub struct Serializer {
    serialize: Option<SerializeFn>,
    deserialize: Option<DeserializeFn>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serialize(
        mut self,
        f: impl Fn(&dyn Taggable) -> Result<Value, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(f));
        self
    }

    pub fn deserialize(
        mut self,
        f: impl Fn(Value) -> Result<Value, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        self.deserialize = Some(Arc::new(f));
        self
    }

    /// Build a pair over one concrete type, downcasting on the way out.
    pub fn typed<T: Taggable>(
        serialize: fn(&T) -> Result<Value, ConfigError>,
        deserialize: fn(Value) -> Result<T, ConfigError>,
    ) -> Self {
        Self::new()
            .serialize(move |object| match object.as_any().downcast_ref::<T>() {
                Some(typed) => serialize(typed),
                None => Err(ConfigError::serialize(
                    object.type_name(),
                    format!("not a {}", std::any::type_name::<T>()),
                )),
            })
            .deserialize(move |payload| deserialize(payload).map(Value::instance))
    }

    pub(crate) fn run_serialize(&self, name: &str, object: &dyn Taggable) -> Result<Value, ConfigError> {
        match &self.serialize {
            Some(f) => f(object),
            None => Err(ConfigError::serialize(name, "no serialize function")),
        }
    }

    pub(crate) fn run_deserialize(&self, name: &str, payload: Value) -> Result<Value, ConfigError> {
        match &self.deserialize {
            Some(f) => f(payload),
            None => Err(ConfigError::deserialize(name, "no deserialize function")),
        }
    }

    fn is_complete(&self) -> bool {
        self.serialize.is_some() && self.deserialize.is_some()
    }
}

/// How a registered type is rebuilt during unpack.
#[derive(Clone)]
pub enum TypeEntry {
    /// Class-like: `new Type(record)`.
    Constructor(ConstructFn),
    /// Plain function: `Type(record)`.
    Function(FunctionFn),
    /// Explicit pair: `deserialize(serialized)`.
    Serializer(Serializer),
}

impl TypeEntry {
    pub fn constructor(
        f: impl Fn(Record) -> Result<Instance, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        TypeEntry::Constructor(Arc::new(f))
    }

    pub fn function(f: impl Fn(Record) -> Result<Value, ConfigError> + Send + Sync + 'static) -> Self {
        TypeEntry::Function(Arc::new(f))
    }

    /// Constructor for a typed model wrapper.
    pub fn model<T: ModelType + 'static>() -> Self {
        Self::constructor(|record| {
            T::from_record(record)
                .map(Instance::new)
                .map_err(|source| ConfigError::Validation {
                    name: T::DESCRIPTOR.name().to_string(),
                    source,
                })
        })
    }

    /// Constructor producing a generic `Model` for a descriptor.
    pub fn descriptor(descriptor: &'static Descriptor) -> Self {
        Self::constructor(move |record| {
            construct(descriptor, record)
                .map(Instance::new)
                .map_err(|source| ConfigError::Validation {
                    name: descriptor.name().to_string(),
                    source,
                })
        })
    }

    fn kind(&self) -> &'static str {
        match self {
            TypeEntry::Constructor(_) => "constructor",
            TypeEntry::Function(_) => "function",
            TypeEntry::Serializer(_) => "serializer",
        }
    }
}

impl From<Serializer> for TypeEntry {
    fn from(serializer: Serializer) -> Self {
        TypeEntry::Serializer(serializer)
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeEntry::{}", self.kind())
    }
}

/// Table from registered type name to [`TypeEntry`].
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `Date` and `Pattern` serializers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register(&mut registry);
        registry
    }

    /// Register one type.
    ///
    /// Fails on an empty name, a name containing whitespace, or a serializer
    /// missing one of its two functions. Registering a name again replaces
    /// the earlier entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        entry: impl Into<TypeEntry>,
    ) -> Result<&mut Self, ConfigError> {
        let name = name.into();
        let entry = entry.into();

        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidRegistration {
                name,
                reason: "type names must be non-empty and contain no whitespace",
            });
        }

        if let TypeEntry::Serializer(serializer) = &entry {
            if !serializer.is_complete() {
                return Err(ConfigError::InvalidRegistration {
                    name,
                    reason: "a serializer needs both serialize and deserialize functions",
                });
            }
        }

        self.types.insert(name, entry);
        Ok(self)
    }

    /// Register several types at once. Stops at the first bad entry.
    pub fn register_all<N, E>(
        &mut self,
        entries: impl IntoIterator<Item = (N, E)>,
    ) -> Result<&mut Self, ConfigError>
    where
        N: Into<String>,
        E: Into<TypeEntry>,
    {
        for (name, entry) in entries {
            self.register(name, entry)?;
        }
        Ok(self)
    }

    /// Register a typed model wrapper under its descriptor name.
    pub fn register_model<T: ModelType + 'static>(&mut self) -> Result<&mut Self, ConfigError> {
        self.register(T::DESCRIPTOR.name(), TypeEntry::model::<T>())
    }

    /// Register generic models of a descriptor under its name.
    pub fn register_descriptor(
        &mut self,
        descriptor: &'static Descriptor,
    ) -> Result<&mut Self, ConfigError> {
        self.register(descriptor.name(), TypeEntry::descriptor(descriptor))
    }

    /// Insert an entry known to be well-formed.
    pub(crate) fn insert(&mut self, name: &str, entry: TypeEntry) {
        self.types.insert(name.to_string(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}
