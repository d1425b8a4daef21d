//! Pack and unpack: the recursive transforms between live trees and plain,
//! JSON-safe trees with `className` tags.

use teamwork_model::{Instance, Record, Value};

use crate::error::ConfigError;
use crate::registry::{TypeEntry, TypeRegistry};
use crate::{CLASS_NAME, SERIALIZED};

impl TypeRegistry {
    /// Turn a live tree into a plain tree.
    ///
    /// - Arrays and maps are packed element by element.
    /// - An instance whose type has a serializer becomes
    ///   `{className, serialized}`.
    /// - Any other instance becomes its packed properties plus `className`.
    /// - Scalars are returned as they are.
    ///
    /// Packing an instance of an unregistered type fails, so a tree that
    /// could not be unpacked again is never produced.
    pub fn pack(&self, value: &Value) -> Result<Value, ConfigError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.pack(item))
                .collect::<Result<_, _>>()
                .map(Value::Array),
            Value::Map(map) => self.pack_record(map).map(Value::Map),
            Value::Instance(instance) => self.pack_instance(instance).map(Value::Map),
            scalar => Ok(scalar.clone()),
        }
    }

    fn pack_record(&self, map: &Record) -> Result<Record, ConfigError> {
        map.iter()
            .map(|(key, value)| Ok((key.clone(), self.pack(value)?)))
            .collect()
    }

    fn pack_instance(&self, instance: &Instance) -> Result<Record, ConfigError> {
        let name = instance.type_name();
        let entry = self.get(name).ok_or_else(|| ConfigError::UnknownType {
            name: name.to_string(),
        })?;

        let mut packed = Record::new();
        packed.insert(CLASS_NAME.to_string(), Value::from(name));

        match entry {
            TypeEntry::Serializer(serializer) => {
                let payload = serializer.run_serialize(name, instance.inner())?;
                packed.insert(SERIALIZED.to_string(), self.pack(&payload)?);
            }
            TypeEntry::Constructor(_) | TypeEntry::Function(_) => {
                for (key, value) in instance.properties() {
                    if key != CLASS_NAME {
                        packed.insert(key, self.pack(&value)?);
                    }
                }
            }
        }

        Ok(packed)
    }

    /// Turn a plain tree back into a live tree.
    ///
    /// A map carrying `className` has the tag stripped and its remaining
    /// properties unpacked into a staging record, which is then handed to the
    /// registered entry. An unregistered name is an error, never a silent
    /// fallback to a plain map.
    pub fn unpack(&self, value: Value) -> Result<Value, ConfigError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.unpack(item))
                .collect::<Result<_, _>>()
                .map(Value::Array),
            Value::Map(mut map) => match map.shift_remove(CLASS_NAME) {
                Some(Value::String(name)) => {
                    let staging = self.unpack_record(map)?;
                    self.revive(&name, staging)
                }
                Some(other) => Err(ConfigError::MalformedTag {
                    found: other.kind(),
                }),
                None => self.unpack_record(map).map(Value::Map),
            },
            other => Ok(other),
        }
    }

    fn unpack_record(&self, map: Record) -> Result<Record, ConfigError> {
        map.into_iter()
            .map(|(key, value)| Ok((key, self.unpack(value)?)))
            .collect()
    }

    fn revive(&self, name: &str, mut staging: Record) -> Result<Value, ConfigError> {
        let entry = self.get(name).ok_or_else(|| ConfigError::UnknownType {
            name: name.to_string(),
        })?;

        match entry {
            TypeEntry::Serializer(serializer) => {
                let payload = staging.shift_remove(SERIALIZED).unwrap_or_default();
                serializer.run_deserialize(name, payload)
            }
            TypeEntry::Constructor(construct) => construct(staging).map(Value::Instance),
            TypeEntry::Function(function) => function(staging),
        }
    }
}
