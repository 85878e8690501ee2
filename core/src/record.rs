//! Schema-validated records.
//!
//! # Design
//! A `Record<S>` is a JSON object restricted to the field table of its
//! `Schema`. The schema is a zero-sized marker type, so `Record<AccountSchema>`
//! and `Record<SettingSchema>` are distinct types sharing one implementation.
//!
//! - Construction seeds every declared field with `null`, then overlays the
//!   supplied map. Unknown keys are dropped silently here, because server
//!   payloads routinely carry extra fields.
//! - After construction, reading or writing an unknown key is an error, every
//!   write passes through `Schema::check_write`, and nothing can be removed.
//! - List fields are stored comma-joined, the way the server stores them.
//!   Arrays are joined on write; `get_list` splits on request.

use std::fmt;
use std::marker::PhantomData;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{AlistError, Result};

static NULL: Value = Value::Null;

/// Field table and write policy of one record kind.
pub trait Schema {
    /// Human-readable kind, used in errors.
    const NAME: &'static str;
    /// Declared fields, seeded with `null`.
    const FIELDS: &'static [&'static str];
    /// Opaque identity field assigned by the server, if the kind has one.
    const IDENTITY: Option<&'static str> = None;
    /// Human-readable key used for lookups next to the identity.
    const SECONDARY_KEY: &'static str;
    /// Fields stored as comma-joined strings.
    const LIST_FIELDS: &'static [&'static str] = &[];
    /// Fields that must be non-null at construction.
    const REQUIRED: &'static [&'static str] = &[];

    /// Validate and coerce `value` before it is written to `field`.
    /// `fields` is the record's current content.
    fn check_write(_fields: &Map<String, Value>, _field: &str, value: Value) -> Result<Value> {
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record<S> {
    fields: Map<String, Value>,
    schema: PhantomData<S>,
}

impl<S: Schema> Record<S> {
    pub fn new(supplied: Map<String, Value>) -> Result<Self> {
        let mut fields: Map<String, Value> = S::FIELDS.iter().map(|f| (f.to_string(), Value::Null)).collect();
        for (key, value) in supplied {
            if is_declared::<S>(&key) {
                let value = join_list::<S>(&key, value)?;
                fields.insert(key, value);
            }
        }

        let missing: Vec<String> = S::REQUIRED
            .iter()
            .filter(|f| fields.get(**f).map_or(true, Value::is_null))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AlistError::MissingRequiredField {
                record: S::NAME.to_string(),
                missing,
            });
        }

        Ok(Self {
            fields,
            schema: PhantomData,
        })
    }

    /// Build from a JSON object; anything else is `InvalidValue`.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::new(map),
            other => Err(AlistError::InvalidValue {
                field: S::NAME.to_string(),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.check_declared(field)?;
        Ok(self.fields.get(field).unwrap_or(&NULL))
    }

    /// String content of `field`, `None` when null or not a string.
    pub fn get_str(&self, field: &str) -> Result<Option<&str>> {
        Ok(self.get(field)?.as_str())
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        self.check_declared(field)?;
        let value = join_list::<S>(field, value.into())?;
        let value = S::check_write(&self.fields, field, value)?;
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    /// Fields can never be removed; this always fails.
    pub fn remove(&mut self, field: &str) -> Result<()> {
        Err(AlistError::DeletionRejected {
            record: S::NAME,
            field: field.to_string(),
        })
    }

    /// Split a comma-joined field. Null and `""` are empty lists.
    pub fn get_list(&self, field: &str) -> Result<Vec<String>> {
        match self.get(field)? {
            Value::Null => Ok(Vec::new()),
            Value::String(s) if s.is_empty() => Ok(Vec::new()),
            Value::String(s) => Ok(s.split(',').map(str::to_string).collect()),
            other => Err(AlistError::InvalidValue {
                field: field.to_string(),
                reason: format!("not a comma-joined list: {other}"),
            }),
        }
    }

    pub fn set_list<I, T>(&mut self, field: &str, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let items: Vec<Value> = items.into_iter().map(|s| Value::String(s.as_ref().to_string())).collect();
        self.set(field, Value::Array(items))
    }

    /// The server-assigned identity, if present.
    pub fn id(&self) -> Option<&Value> {
        S::IDENTITY
            .and_then(|f| self.fields.get(f))
            .filter(|v| !v.is_null())
    }

    pub fn secondary_key(&self) -> Option<&str> {
        self.fields.get(S::SECONDARY_KEY).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    fn check_declared(&self, field: &str) -> Result<()> {
        if is_declared::<S>(field) {
            Ok(())
        } else {
            Err(AlistError::UnknownField {
                record: S::NAME,
                field: field.to_string(),
            })
        }
    }
}

fn is_declared<S: Schema>(field: &str) -> bool {
    S::FIELDS.contains(&field) || S::IDENTITY == Some(field)
}

fn join_list<S: Schema>(field: &str, value: Value) -> Result<Value> {
    if !S::LIST_FIELDS.contains(&field) {
        return Ok(value);
    }
    let Value::Array(items) = value else {
        return Ok(value);
    };
    let parts = items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(AlistError::InvalidValue {
                field: field.to_string(),
                reason: format!("list items must be strings, got {other}"),
            }),
        })
        .collect::<Result<Vec<String>>>()?;
    Ok(Value::String(parts.join(",")))
}

impl<S> Serialize for Record<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de, S: Schema> Deserialize<'de> for Record<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::deserialize(deserializer)?;
        Record::new(map).map_err(D::Error::custom)
    }
}

impl<S> fmt::Display for Record<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.fields.clone()))
    }
}
