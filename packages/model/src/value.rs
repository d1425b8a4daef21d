//! The Value type - a tree that may carry live typed instances.
//!
//! A packed config tree and a decoded API response are both plain `Value`
//! trees. Once unpacked or constructed, some nodes become `Value::Instance`.

use indexmap::IndexMap;

use crate::taggable::{Instance, Taggable};

/// Ordered string-keyed map. Iteration follows insertion order, which is
/// what keeps `Model::to_json` in descriptor order.
pub type Record = IndexMap<String, Value>;

/// A tree-shaped value held by models and the config store.
///
/// # Design Notes
///
/// - `Undefined` is a present key with no value. It is distinct from `Null`,
///   and is dropped when written out as JSON (like an absent key).
/// - `Instance` holds a live typed object. Plain trees never contain one.
/// - Integers and floats are kept apart so coercion results are exact.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Explicitly present, but without a value.
    #[default]
    Undefined,
    /// JSON null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Plain object with ordered string keys.
    Map(Record),
    /// Live instance of a registered type.
    Instance(Instance),
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(Record::new())
    }

    /// Wrap a typed object as an instance value.
    pub fn instance<T: Taggable>(object: T) -> Self {
        Value::Instance(Instance::new(object))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, Value::Instance(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Floats with no fractional part also qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Borrow the typed object inside an instance value.
    pub fn downcast_ref<T: Taggable>(&self) -> Option<&T> {
        self.as_instance()?.downcast_ref()
    }

    /// Look up a key in a map, or a property of an instance.
    ///
    /// Instance properties are computed, so this returns an owned value.
    pub fn property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(key).cloned(),
            Value::Instance(instance) => instance.properties().shift_remove(key),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
            Value::Instance(_) => "instance",
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Map(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Instance(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Undefined, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}
