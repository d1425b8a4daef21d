//! Model instances and the `construct` algorithm.

use crate::descriptor::{Descriptor, FieldSpec};
use crate::error::{CoercionError, ValidationError};
use crate::taggable::{Instance, Taggable};
use crate::value::{Record, Value};

/// An object whose fields come from applying a [`Descriptor`] to a record.
///
/// Every descriptor key is present in `fields`, in descriptor order. Other
/// properties set at runtime live apart, so `to_json` never sees them.
#[derive(Clone, Debug)]
pub struct Model {
    descriptor: &'static Descriptor,
    fields: Record,
    extras: Record,
}

/// Apply a descriptor to a raw record.
///
/// Fields are processed in descriptor order and the first missing required
/// field aborts construction. Keys of `data` the descriptor does not name are
/// ignored. A non-empty array is coerced element by element; an empty array
/// is kept as it is. `Null` is passed through without coercion.
pub fn construct(descriptor: &'static Descriptor, mut data: Record) -> Result<Model, ValidationError> {
    let mut fields = Record::with_capacity(descriptor.len());

    for (name, spec) in descriptor.fields() {
        let input = data
            .swap_remove(name)
            .filter(|value| !value.is_undefined());

        let value = match input {
            None if spec.is_required() => {
                return Err(ValidationError::Required {
                    field: name.to_string(),
                });
            }
            None => Value::Undefined,
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(
                items
                    .into_iter()
                    .map(|item| coerce_field(name, spec, item))
                    .collect::<Result<_, _>>()?,
            ),
            Some(value) if value.is_array() || value.is_null() => value,
            Some(value) => coerce_field(name, spec, value)?,
        };

        fields.insert(name.to_string(), value);
    }

    Ok(Model {
        descriptor,
        fields,
        extras: Record::new(),
    })
}

fn coerce_field(name: &str, spec: FieldSpec, raw: Value) -> Result<Value, ValidationError> {
    let wrap = |source: CoercionError| ValidationError::Coercion {
        field: name.to_string(),
        source,
    };

    match spec {
        FieldSpec::RequiredFn(coerce) | FieldSpec::OptionalFn(coerce) => coerce(raw).map_err(wrap),
        FieldSpec::Required(constructor) | FieldSpec::Optional(constructor) => match raw {
            // Already built, e.g. handed over by another model.
            Value::Instance(instance) => Ok(Value::Instance(instance)),
            Value::Map(record) => constructor(record).map(Value::Instance),
            other => Err(wrap(CoercionError::new("an object", other.kind()))),
        },
    }
}

impl Model {
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// A descriptor field. Unknown keys read as `Undefined`.
    pub fn field(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&Value::Undefined)
    }

    /// A descriptor field or a runtime property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).or_else(|| self.extras.get(key))
    }

    /// Set a property. Descriptor keys update the field, any other key is
    /// kept as a runtime property excluded from `to_json`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if self.descriptor.contains(&key) {
            self.fields.insert(key, value);
        } else {
            self.extras.insert(key, value);
        }
    }

    /// Exactly the descriptor keys, in descriptor order.
    ///
    /// Nested instances are returned as they are; flattening them is the
    /// job of the config layer.
    pub fn to_json(&self) -> Record {
        self.descriptor
            .keys()
            .map(|key| (key.to_string(), self.field(key).clone()))
            .collect()
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.field(key).as_str()
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.field(key).as_i64()
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.field(key).as_bool()
    }

    /// A nested model field, downcast to its typed wrapper.
    pub fn nested<T: Taggable>(&self, key: &str) -> Option<&T> {
        self.field(key).downcast_ref()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name() == other.descriptor.name()
            && self.fields == other.fields
            && self.extras == other.extras
    }
}

impl Taggable for Model {
    fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    fn properties(&self) -> Record {
        let mut properties = self.fields.clone();
        properties.extend(self.extras.iter().map(|(k, v)| (k.clone(), v.clone())));
        properties
    }
}

/// A typed wrapper around a [`Model`] built from a fixed descriptor.
///
/// `from_model` is where wrappers derive their runtime properties.
pub trait ModelType: Taggable + Sized {
    const DESCRIPTOR: &'static Descriptor;

    fn from_model(model: Model) -> Self;

    fn model(&self) -> &Model;

    fn from_record(data: Record) -> Result<Self, ValidationError> {
        construct(Self::DESCRIPTOR, data).map(Self::from_model)
    }

    /// Constructor-style rule for fields holding this type.
    fn construct_instance(data: Record) -> Result<Instance, ValidationError> {
        Self::from_record(data).map(Instance::new)
    }

    fn to_json(&self) -> Record {
        self.model().to_json()
    }
}
