//! Field descriptors.

use crate::error::{CoercionError, ValidationError};
use crate::taggable::Instance;
use crate::value::{Record, Value};

/// Constructor-style rule: builds a nested instance from a sub-record.
pub type Constructor = fn(Record) -> Result<Instance, ValidationError>;

/// Callable rule: a plain function from raw value to coerced value.
pub type Coerce = fn(Value) -> Result<Value, CoercionError>;

/// How one field is validated and coerced.
#[derive(Clone, Copy, Debug)]
pub enum FieldSpec {
    /// Must be present; the raw sub-record is passed to the constructor.
    Required(Constructor),
    /// May be absent; the raw sub-record is passed to the constructor.
    Optional(Constructor),
    /// Must be present; the raw value is passed to the function.
    RequiredFn(Coerce),
    /// May be absent; the raw value is passed to the function.
    OptionalFn(Coerce),
}

impl FieldSpec {
    pub fn is_required(&self) -> bool {
        matches!(self, FieldSpec::Required(_) | FieldSpec::RequiredFn(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, FieldSpec::RequiredFn(_) | FieldSpec::OptionalFn(_))
    }
}

/// An ordered field table with the name its models are registered under.
///
/// Descriptors are meant to live in statics:
///
/// ```rust
/// use teamwork_model::{coerce, Descriptor, FieldSpec};
///
/// static TAG: Descriptor = Descriptor::new(
///     "Tag",
///     &[
///         ("id", FieldSpec::RequiredFn(coerce::integer)),
///         ("name", FieldSpec::RequiredFn(coerce::string)),
///         ("color", FieldSpec::OptionalFn(coerce::string)),
///     ],
/// );
///
/// assert_eq!(TAG.keys().collect::<Vec<_>>(), ["id", "name", "color"]);
/// ```
#[derive(Debug)]
pub struct Descriptor {
    name: &'static str,
    fields: &'static [(&'static str, FieldSpec)],
}

impl Descriptor {
    pub const fn new(name: &'static str, fields: &'static [(&'static str, FieldSpec)]) -> Self {
        Self { name, fields }
    }

    /// The registered type name of models built from this descriptor.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldSpec)> + '_ {
        self.fields.iter().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(key, _)| *key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce;

    static SAMPLE: Descriptor = Descriptor::new(
        "Sample",
        &[
            ("a", FieldSpec::RequiredFn(coerce::integer)),
            ("b", FieldSpec::OptionalFn(coerce::string)),
        ],
    );

    #[test]
    fn field_spec_flags() {
        let spec = FieldSpec::OptionalFn(coerce::string);
        assert!(!spec.is_required());
        assert!(spec.is_callable());

        let spec = FieldSpec::RequiredFn(coerce::string);
        assert!(spec.is_required());
        assert!(spec.is_callable());
    }

    #[test]
    fn descriptor_lookup() {
        assert_eq!(SAMPLE.name(), "Sample");
        assert_eq!(SAMPLE.len(), 2);
        assert!(SAMPLE.contains("b"));
        assert!(!SAMPLE.contains("c"));
    }
}
