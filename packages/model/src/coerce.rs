//! Callable coercion rules for use with `FieldSpec::RequiredFn` and
//! `FieldSpec::OptionalFn`.
//!
//! API payloads are loose: numbers arrive as strings, flags as `"1"`, dates as
//! ISO strings. These functions normalize the common cases and reject the
//! rest with a [`CoercionError`].

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::CoercionError;
use crate::taggable::Instance;
use crate::value::Value;

/// Keep the value unchanged.
pub fn identity(value: Value) -> Result<Value, CoercionError> {
    Ok(value)
}

/// Render scalars as a string.
pub fn string(value: Value) -> Result<Value, CoercionError> {
    match value {
        Value::String(s) => Ok(Value::String(s)),
        Value::Integer(i) => Ok(Value::String(i.to_string())),
        Value::Float(f) => Ok(Value::String(format_float(f))),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(CoercionError::new("a string", other.kind())),
    }
}

/// Parse a number, keeping integers exact.
///
/// An empty or blank string is zero.
pub fn number(value: Value) -> Result<Value, CoercionError> {
    match value {
        Value::Integer(_) | Value::Float(_) => Ok(value),
        Value::Bool(b) => Ok(Value::Integer(i64::from(b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Value::Integer(0));
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(CoercionError::new("a number", format!("{:?}", s))),
            }
        }
        other => Err(CoercionError::new("a number", other.kind())),
    }
}

/// Parse the leading integer of a string, like `parseInt(s, 10)`.
///
/// `"42px"` is 42, `"  -7"` is -7, floats are truncated.
pub fn integer(value: Value) -> Result<Value, CoercionError> {
    match value {
        Value::Integer(_) => Ok(value),
        Value::Float(f) if f.is_finite() => Ok(Value::Integer(f.trunc() as i64)),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let sign_len = usize::from(trimmed.starts_with(['-', '+']));
            let digits = trimmed[sign_len..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(trimmed.len(), |end| end + sign_len);

            trimmed[..digits]
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| CoercionError::new("an integer", format!("{:?}", s)))
        }
        other => Err(CoercionError::new("an integer", other.kind())),
    }
}

/// Read a flag. Accepts booleans, `0`/`1` and their string forms.
pub fn boolean(value: Value) -> Result<Value, CoercionError> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::Integer(i) => Ok(Value::Bool(i != 0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::new("a boolean", format!("{:?}", s))),
        },
        other => Err(CoercionError::new("a boolean", other.kind())),
    }
}

/// Build a `Date` instance from an RFC 3339 string, a Teamwork compact
/// timestamp (`20240102T030405Z`) or epoch milliseconds.
pub fn timestamp(value: Value) -> Result<Value, CoercionError> {
    if let Value::Instance(instance) = &value {
        if instance.is::<DateTime<Utc>>() {
            return Ok(value);
        }
    }

    let parsed = match &value {
        Value::String(s) => parse_timestamp(s),
        Value::Integer(ms) => Utc.timestamp_millis_opt(*ms).single(),
        _ => None,
    };

    parsed
        .map(|date| Value::Instance(Instance::new(date)))
        .ok_or_else(|| CoercionError::new("a timestamp", describe(&value)))
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{:?}", s),
        other => other.kind().to_string(),
    }
}

/// Integral floats print without a fraction, as JSON numbers do.
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
