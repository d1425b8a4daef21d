//! Conversions between Value and serde_json::Value.

use crate::error::ConvertError;
use crate::value::{Record, Value};

/// Convert our Value to serde_json::Value.
///
/// Follows `JSON.stringify`: undefined map entries are dropped and undefined
/// array elements become null. Live instances cannot be written.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, ConvertError> {
    Ok(match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(
            arr.iter().map(value_to_json).collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_undefined())
                .map(|(k, v)| Ok((k.clone(), value_to_json(v)?)))
                .collect::<Result<_, ConvertError>>()?,
        ),
        Value::Instance(instance) => {
            return Err(ConvertError::UnpackedInstance {
                type_name: instance.type_name().to_string(),
            })
        }
    })
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

/// Convert a JSON object to a Record. Anything else yields an empty record.
pub fn json_to_record(json: serde_json::Value) -> Record {
    match json_to_value(json) {
        Value::Map(record) => record,
        _ => Record::new(),
    }
}
