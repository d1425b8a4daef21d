//! Descriptor Model for the Teamwork CLI
//!
//! This layer turns loosely-typed records (decoded API responses, unpacked
//! config entries) into validated, coerced model instances:
//! - `Value`: Dynamically-typed tree, able to hold live typed instances
//! - `Record`: Ordered string-keyed map of values
//! - `Taggable`: Capability of any value the config layer can persist by name
//! - `Descriptor`: Ordered field table driving `construct`
//! - `Model`: An instance produced by applying a descriptor to a record
//!
//! # Example
//!
//! ```rust
//! use teamwork_model::{coerce, construct, record, Descriptor, FieldSpec, Value};
//!
//! static TASK: Descriptor = Descriptor::new(
//!     "Task",
//!     &[
//!         ("id", FieldSpec::RequiredFn(coerce::integer)),
//!         ("title", FieldSpec::RequiredFn(coerce::string)),
//!     ],
//! );
//!
//! let task = construct(&TASK, record! { "id" => "5", "title" => "Fix bug" }).unwrap();
//! assert_eq!(task.field("id"), &Value::Integer(5));
//! ```

pub mod coerce;
mod convert;
mod descriptor;
mod error;
mod model;
mod taggable;
mod value;

pub use convert::{json_to_record, json_to_value, value_to_json};
pub use descriptor::{Coerce, Constructor, Descriptor, FieldSpec};
pub use error::{CoercionError, ConvertError, ValidationError};
pub use model::{construct, Model, ModelType};
pub use taggable::{DynCompare, Instance, Taggable, DATE_TYPE};
pub use value::{Record, Value};

/// Build a [`Record`] from `key => value` pairs, preserving their order.
///
/// Values go through `Value::from`.
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(
            record.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        record
    }};
}
