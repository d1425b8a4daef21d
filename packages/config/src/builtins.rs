//! Built-in serializers for values that are not tree-shaped: calendar
//! timestamps (`Date`) and regular expressions (`Pattern`).

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::{Regex, RegexBuilder};
use teamwork_model::{record, Record, Taggable, Value, DATE_TYPE};

use crate::error::ConfigError;
use crate::registry::{Serializer, TypeRegistry};

/// Registered type name of [`Pattern`].
pub const PATTERN_TYPE: &str = "Pattern";

pub(crate) fn register(registry: &mut TypeRegistry) {
    registry.insert(DATE_TYPE, date_serializer().into());
    registry.insert(PATTERN_TYPE, pattern_serializer().into());
}

fn date_serializer() -> Serializer {
    Serializer::typed::<DateTime<Utc>>(
        |date| Ok(Value::String(date.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        |payload| {
            let text = payload
                .as_str()
                .ok_or_else(|| ConfigError::deserialize(DATE_TYPE, "expected an ISO 8601 string"))?;
            DateTime::parse_from_rfc3339(text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|e| ConfigError::deserialize(DATE_TYPE, e.to_string()))
        },
    )
}

fn pattern_serializer() -> Serializer {
    Serializer::typed::<Pattern>(
        |pattern| {
            Ok(Value::Map(record! {
                "source" => pattern.source(),
                "flags" => pattern.flags(),
            }))
        },
        |payload| {
            let field = |key: &str| {
                payload
                    .as_map()
                    .and_then(|map| map.get(key))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            let source = field("source")
                .ok_or_else(|| ConfigError::deserialize(PATTERN_TYPE, "missing source"))?;
            let flags = field("flags").unwrap_or_default();
            Pattern::new(&source, &flags)
                .map_err(|e| ConfigError::deserialize(PATTERN_TYPE, e.to_string()))
        },
    )
}

#[derive(thiserror::Error, Debug)]
pub enum PatternError {
    #[error("Invalid pattern: {0}")]
    Syntax(#[from] regex::Error),

    #[error("Invalid pattern flag '{0}'")]
    Flag(char),
}

/// A compiled regular expression that remembers its source and flags.
///
/// Flags follow the usual single-letter convention: `i` (case-insensitive),
/// `m` (multi-line), `s` (dot matches newline), `x` (verbose), plus `g`,
/// `u` and `y`, which are kept for the round trip but do not change
/// matching.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                'g' | 'u' | 'y' => &mut builder,
                other => return Err(PatternError::Flag(other)),
            };
        }

        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex: builder.build()?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl Taggable for Pattern {
    fn type_name(&self) -> &str {
        PATTERN_TYPE
    }

    fn properties(&self) -> Record {
        record! { "source" => self.source(), "flags" => self.flags() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CLASS_NAME, SERIALIZED};

    #[test]
    fn pattern_flags_change_matching() {
        let pattern = Pattern::new("^fix", "im").unwrap();
        assert!(pattern.is_match("chore\nFIX bug"));
        assert!(!Pattern::new("^fix", "").unwrap().is_match("FIX"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(matches!(Pattern::new("a", "q"), Err(PatternError::Flag('q'))));
        assert!(matches!(Pattern::new("(", ""), Err(PatternError::Syntax(_))));
    }

    #[test]
    fn date_packs_to_iso_string() {
        let registry = TypeRegistry::with_builtins();
        let date = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);

        let packed = registry.pack(&Value::instance(date)).unwrap();
        assert_eq!(
            packed,
            Value::Map(record! {
                CLASS_NAME => DATE_TYPE,
                SERIALIZED => "2024-01-02T03:04:05Z",
            })
        );
    }

    #[test]
    fn date_round_trips_to_the_same_instant() {
        let registry = TypeRegistry::with_builtins();
        let now = Value::instance(Utc::now());

        let unpacked = registry.unpack(registry.pack(&now).unwrap()).unwrap();
        assert_eq!(unpacked, now);
    }

    #[test]
    fn pattern_round_trips_source_and_flags() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::Map(record! {
            "foo" => Value::instance(Pattern::new("12345", "").unwrap()),
            "bar" => Value::instance(Pattern::new("12456", "g").unwrap()),
        });

        let unpacked = registry.unpack(registry.pack(&value).unwrap()).unwrap();
        assert_eq!(unpacked, value);

        let bar: &Pattern = unpacked.as_map().unwrap()["bar"].downcast_ref().unwrap();
        assert_eq!(bar.source(), "12456");
        assert!(bar.is_global());
    }

    #[test]
    fn bad_date_payload_fails() {
        let registry = TypeRegistry::with_builtins();
        let err = registry
            .unpack(Value::Map(record! { CLASS_NAME => DATE_TYPE, SERIALIZED => 5 }))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize { .. }));
    }
}
