//! Storage drivers and their configuration schemas.
//!
//! # Design
//! `GET /admin/drivers` returns `{driver_name: [attribute, ...]}`. The
//! registry turns that catalog into a name-indexed lookup table once per
//! fetch. Account creation checks the driver's required attributes against
//! the registry locally, so a request that the server would reject for a
//! missing field never leaves the process.

use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{AlistError, Result};
use crate::session::Session;
use crate::transport::Transport;

pub const DRIVERS_ENDPOINT: &str = "/admin/drivers";

/// One configuration attribute of a driver. Read-only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverAttribute {
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    label: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default)]
    default: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    values: String,
    #[serde(default, deserialize_with = "null_as_default")]
    required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
}

/// Servers send `null` for unset attribute properties.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DriverAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn values(&self) -> &str {
        &self.values
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    name: String,
    attrs: Vec<DriverAttribute>,
}

impl Driver {
    pub fn new(name: &str, attrs: Vec<DriverAttribute>) -> Self {
        Self {
            name: name.to_string(),
            attrs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &[DriverAttribute] {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> Result<&DriverAttribute> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| AlistError::not_found("driver attribute", name))
    }

    /// Names of the attributes flagged required, in schema order.
    pub fn required(&self) -> Vec<&str> {
        self.attrs.iter().filter(|a| a.required).map(|a| a.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    drivers: Vec<Driver>,
    loaded: bool,
}

impl DriverRegistry {
    pub fn from_catalog(catalog: Map<String, Value>) -> Result<Self> {
        let drivers = catalog
            .into_iter()
            .map(|(name, attrs)| {
                let attrs: Vec<DriverAttribute> = serde_json::from_value(attrs).map_err(|source| {
                    AlistError::UnexpectedPayload {
                        expected: "driver attribute list",
                        source,
                    }
                })?;
                Ok(Driver::new(&name, attrs))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { drivers, loaded: true })
    }

    /// Replace the registry with a fresh catalog from the server.
    pub fn fetch<T: Transport>(&mut self, session: &mut Session<T>) -> Result<&[Driver]> {
        *self = Self::default();
        let catalog: Option<Map<String, Value>> = session
            .get(DRIVERS_ENDPOINT, Default::default())?
            .into_data("driver catalog")?;
        *self = Self::from_catalog(catalog.unwrap_or_default())?;
        debug!("loaded {} drivers", self.drivers.len());
        Ok(&self.drivers)
    }

    /// Whether a catalog has been loaded since construction.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.drivers.iter().map(Driver::name)
    }

    pub fn get(&self, name: &str) -> Result<&Driver> {
        self.drivers
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| AlistError::not_found("driver", name))
    }

    /// Check that `fields` names every attribute `driver_type` requires,
    /// plus `name`.
    pub fn validate_account(&self, driver_type: &str, fields: &Map<String, Value>) -> Result<()> {
        let driver = self.get(driver_type)?;
        let mut required = driver.required();
        if !required.contains(&"name") {
            required.push("name");
        }
        let missing: Vec<String> = required
            .into_iter()
            .filter(|f| !fields.contains_key(*f))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AlistError::MissingRequiredField {
                record: driver_type.to_string(),
                missing,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registry() -> DriverRegistry {
        let catalog = json!({
            "Native": [
                {"name": "root_folder", "label": "root folder path", "type": "string", "required": true, "default": "", "values": "", "description": ""},
                {"name": "order_by", "label": "order_by", "type": "select", "values": "name,size", "required": false}
            ],
            "Onedrive": [
                {"name": "client_id", "label": "client id", "type": "string", "required": true},
                {"name": "client_secret", "label": "client secret", "type": "string", "required": true},
                {"name": "zone", "label": "zone", "type": "select", "values": "global,cn", "required": true}
            ]
        });
        DriverRegistry::from_catalog(catalog.as_object().unwrap().clone()).unwrap()
    }

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn required_attributes_in_schema_order() {
        let registry = registry();
        assert_eq!(registry.get("Onedrive").unwrap().required(), vec!["client_id", "client_secret", "zone"]);
        assert_eq!(registry.get("Native").unwrap().required(), vec!["root_folder"]);
    }

    #[test]
    fn lookups_fail_with_not_found() {
        let registry = registry();
        assert!(matches!(registry.get("FTP"), Err(AlistError::NotFound { .. })));
        let native = registry.get("Native").unwrap();
        assert_eq!(native.attr("order_by").unwrap().values(), "name,size");
        assert!(matches!(native.attr("bucket"), Err(AlistError::NotFound { .. })));
    }

    #[test]
    fn validate_lists_missing_names() {
        let registry = registry();
        let err = registry
            .validate_account("Onedrive", &fields(json!({"name": "/od", "client_id": "id", "zone": "global"})))
            .unwrap_err();
        match err {
            AlistError::MissingRequiredField { record, missing } => {
                assert_eq!(record, "Onedrive");
                assert_eq!(missing, vec!["client_secret".to_string()]);
            }
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }

    #[test]
    fn validate_requires_name() {
        let registry = registry();
        let err = registry
            .validate_account("Native", &fields(json!({"root_folder": "/srv"})))
            .unwrap_err();
        assert!(matches!(err, AlistError::MissingRequiredField { ref missing, .. } if missing == &vec!["name".to_string()]));
        registry
            .validate_account("Native", &fields(json!({"name": "/local", "root_folder": "/srv"})))
            .unwrap();
    }

    #[test]
    fn validate_unknown_driver_is_not_found() {
        let err = registry().validate_account("FTP", &Map::new()).unwrap_err();
        assert!(matches!(err, AlistError::NotFound { kind: "driver", .. }));
    }

    #[test]
    fn null_attribute_properties_read_as_empty() {
        let catalog = json!({
            "S3": [
                {"name": "bucket", "label": null, "type": "string", "values": null, "required": null, "description": null}
            ]
        });
        let registry = DriverRegistry::from_catalog(fields(catalog)).unwrap();
        let attr = registry.get("S3").unwrap().attr("bucket").unwrap();
        assert_eq!(attr.label(), "");
        assert_eq!(attr.values(), "");
        assert_eq!(attr.description(), "");
        assert!(!attr.is_required());
    }

    #[test]
    fn attributes_are_read_only_accessors() {
        let registry = registry();
        let attr = registry.get("Native").unwrap().attr("root_folder").unwrap();
        assert_eq!(attr.label(), "root folder path");
        assert_eq!(attr.kind(), "string");
        assert!(attr.is_required());
        assert_eq!(attr.default_value(), &json!(""));
        assert!(registry.is_loaded());
        assert!(!DriverRegistry::default().is_loaded());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Native", "Onedrive"]);
    }
}
