//! Server settings.
//!
//! Only `value` may change after a setting is loaded. Writes are coerced by
//! the setting's `type`: `bool` takes `true`/`false`, `select` takes one of
//! the comma-separated `values`, everything else takes a string.

use serde_json::{Map, Value};

use crate::error::{AlistError, Result};
use crate::record::{Record, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSchema;

impl Schema for SettingSchema {
    const NAME: &'static str = "setting";
    const FIELDS: &'static [&'static str] =
        &["key", "value", "description", "type", "group", "access", "values", "version"];
    const SECONDARY_KEY: &'static str = "key";
    const REQUIRED: &'static [&'static str] = &["key"];

    fn check_write(fields: &Map<String, Value>, field: &str, value: Value) -> Result<Value> {
        if field != "value" {
            return Err(AlistError::ImmutableField {
                record: Self::NAME,
                field: field.to_string(),
            });
        }
        let kind = fields.get("type").and_then(Value::as_str).unwrap_or_default();
        coerce(kind, fields.get("values").and_then(Value::as_str), value)
    }
}

pub type Setting = Record<SettingSchema>;

/// Setting groups understood by `GET /admin/settings?group=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingGroup {
    Front = 0,
    Back = 1,
    Other = 2,
}

impl SettingGroup {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// A setting value converted for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
    Null,
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<SettingValue> for Value {
    fn from(v: SettingValue) -> Self {
        match v {
            SettingValue::Bool(b) => Value::Bool(b),
            SettingValue::Text(s) => Value::String(s),
            SettingValue::Null => Value::Null,
        }
    }
}

fn coerce(kind: &str, values: Option<&str>, value: Value) -> Result<Value> {
    let invalid = |reason: String| AlistError::InvalidValue {
        field: "value".to_string(),
        reason,
    };
    match kind {
        "bool" => match value {
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::String(s) if s == "true" || s == "false" => Ok(Value::String(s)),
            other => Err(invalid(format!("bool setting takes true or false, got {other}"))),
        },
        "select" => {
            let options = values.unwrap_or_default();
            match value {
                Value::String(s) if options.split(',').any(|o| o == s) => Ok(Value::String(s)),
                other => Err(invalid(format!("select setting takes one of {options}, got {other}"))),
            }
        }
        _ => match value {
            Value::String(s) => Ok(Value::String(s)),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            other => Err(invalid(format!("expected a string, got {other}"))),
        },
    }
}

impl Record<SettingSchema> {
    pub fn key(&self) -> &str {
        self.secondary_key().unwrap_or_default()
    }

    pub fn kind(&self) -> Option<&str> {
        self.as_map().get("type").and_then(Value::as_str)
    }

    pub fn group(&self) -> Option<i64> {
        self.as_map().get("group").and_then(Value::as_i64)
    }

    /// Options of a `select` setting; empty for other types.
    pub fn options(&self) -> Vec<&str> {
        match (self.kind(), self.as_map().get("values").and_then(Value::as_str)) {
            (Some("select"), Some(values)) => values.split(',').collect(),
            _ => Vec::new(),
        }
    }

    /// The value converted by type: `bool` settings read as booleans.
    pub fn typed_value(&self) -> SettingValue {
        let raw = self.as_map().get("value").unwrap_or(&Value::Null);
        match (self.kind(), raw) {
            (Some("bool"), raw) => SettingValue::Bool(raw.as_str() == Some("true")),
            (_, Value::Null) => SettingValue::Null,
            (_, Value::String(s)) => SettingValue::Text(s.clone()),
            (_, other) => SettingValue::Text(other.to_string()),
        }
    }

    /// Coerce and store a new value, returning what was stored.
    pub fn set_value(&mut self, value: impl Into<SettingValue>) -> Result<SettingValue> {
        self.set("value", Value::from(value.into()))?;
        Ok(self.typed_value())
    }
}
