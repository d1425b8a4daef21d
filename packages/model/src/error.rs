//! Error types for the model layer.

/// A coercion function rejected its input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("expected {expected}, found {found}")]
pub struct CoercionError {
    pub expected: &'static str,
    pub found: String,
}

impl CoercionError {
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

/// An input record does not satisfy a descriptor.
///
/// Always attributable to a single field.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required field \"{field}\" not found.")]
    Required { field: String },

    #[error("Invalid field \"{field}\": {source}")]
    Coercion {
        field: String,
        source: CoercionError,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field } | ValidationError::Coercion { field, .. } => field,
        }
    }
}

/// A value tree could not be written out as JSON.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("cannot write a live {type_name} instance as JSON, pack it first")]
    UnpackedInstance { type_name: String },
}
