//! Per-path metadata: password, hidden files, guest upload, readme.

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::record::{Record, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaSchema;

impl Schema for MetaSchema {
    const NAME: &'static str = "meta";
    const FIELDS: &'static [&'static str] = &["path", "password", "hide", "only_shows", "upload", "readme"];
    const IDENTITY: Option<&'static str> = Some("id");
    const SECONDARY_KEY: &'static str = "path";
    const LIST_FIELDS: &'static [&'static str] = &["hide", "only_shows"];
}

pub type Meta = Record<MetaSchema>;

impl Record<MetaSchema> {
    pub fn path(&self) -> Option<&str> {
        self.secondary_key()
    }

    pub fn upload(&self) -> bool {
        self.as_map().get("upload").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Hidden file patterns.
    pub fn hide(&self) -> Result<Vec<String>> {
        self.get_list("hide")
    }

    /// The only file patterns shown, if restricted.
    pub fn only_shows(&self) -> Result<Vec<String>> {
        self.get_list("only_shows")
    }
}

/// Fields for `POST /admin/meta/create`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaDraft {
    pub path: String,
    pub password: Option<String>,
    pub hide: Option<Vec<String>>,
    pub only_shows: Option<Vec<String>>,
    pub upload: bool,
    pub readme: Option<String>,
}

impl MetaDraft {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn into_meta(self) -> Result<Meta> {
        let mut fields = Map::new();
        fields.insert("path".to_string(), json!(self.path));
        fields.insert("password".to_string(), json!(self.password));
        fields.insert("hide".to_string(), json!(self.hide));
        fields.insert("only_shows".to_string(), json!(self.only_shows));
        fields.insert("upload".to_string(), json!(self.upload));
        fields.insert("readme".to_string(), json!(self.readme));
        Meta::new(fields)
    }
}
