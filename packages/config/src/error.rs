use teamwork_model::{ConvertError, ValidationError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid registration for \"{name}\": {reason}.")]
    InvalidRegistration { name: String, reason: &'static str },

    #[error("Unknown model {name}.")]
    UnknownType { name: String },

    #[error("Malformed type tag: expected a string className, found {found}.")]
    MalformedTag { found: &'static str },

    #[error("Config root must be an object, found {found}.")]
    MalformedRoot { found: &'static str },

    #[error("Could not serialize {name}: {message}")]
    Serialize { name: String, message: String },

    #[error("Could not deserialize {name}: {message}")]
    Deserialize { name: String, message: String },

    #[error("Invalid {name}: {source}")]
    Validation {
        name: String,
        source: ValidationError,
    },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl ConfigError {
    pub(crate) fn deserialize(name: &str, message: impl Into<String>) -> Self {
        ConfigError::Deserialize {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn serialize(name: &str, message: impl Into<String>) -> Self {
        ConfigError::Serialize {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
