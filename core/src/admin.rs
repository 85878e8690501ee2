//! Endpoints under `/admin`.
//!
//! # Design
//! Lookups by id or name always refetch the list first, so they see the
//! server's current state. Account creation is the exception on the driver
//! side: it validates against the registry already in memory and only
//! fetches the catalog when none was ever loaded. A creation missing a
//! required attribute therefore fails without touching the network.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{json, Map, Value};

use crate::account::Account;
use crate::client::AlistClient;
use crate::collection::Lookup;
use crate::driver::{Driver, DriverRegistry};
use crate::envelope::Payload;
use crate::error::{AlistError, Result};
use crate::meta::{Meta, MetaDraft};
use crate::request::RequestOptions;
use crate::setting::{Setting, SettingGroup, SettingValue};
use crate::transport::Transport;

pub const ACCOUNTS_ENDPOINT: &str = "/admin/accounts";
pub const METAS_ENDPOINT: &str = "/admin/metas";

pub struct Admin<'a, T> {
    client: &'a mut AlistClient<T>,
}

/// Reads or updates one setting by key.
///
/// Built by `Admin::setting_accessors` from the server's catalog instead of
/// one method per setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingAccessor {
    key: String,
}

impl SettingAccessor {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get<T: Transport>(&self, admin: &mut Admin<'_, T>) -> Result<SettingValue> {
        admin.get_or_update(&self.key, None)
    }

    pub fn update<T: Transport>(&self, admin: &mut Admin<'_, T>, new: impl Into<SettingValue>) -> Result<SettingValue> {
        admin.get_or_update(&self.key, Some(new.into()))
    }
}

/// Required fields of a OneDrive account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnedriveAccount {
    pub name: String,
    pub zone: String,
    pub internal_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: String,
}

impl<'a, T: Transport> Admin<'a, T> {
    pub(crate) fn new(client: &'a mut AlistClient<T>) -> Self {
        Self { client }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// All settings, or those of one group.
    pub fn settings(&mut self, group: Option<SettingGroup>) -> Result<Vec<Setting>> {
        let mut options = RequestOptions::new();
        if let Some(group) = group {
            options = options.query("group", group.code());
        }
        let settings: Option<Vec<Setting>> = self
            .client
            .session
            .get("/admin/settings", options)?
            .into_data("setting list")?;
        Ok(settings.unwrap_or_default())
    }

    pub fn frontend(&mut self) -> Result<Vec<Setting>> {
        self.settings(Some(SettingGroup::Front))
    }

    pub fn backend(&mut self) -> Result<Vec<Setting>> {
        self.settings(Some(SettingGroup::Back))
    }

    pub fn other(&mut self) -> Result<Vec<Setting>> {
        self.settings(Some(SettingGroup::Other))
    }

    pub fn setting(&mut self, key: &str) -> Result<Setting> {
        self.settings(None)?
            .into_iter()
            .find(|s| s.key() == key)
            .ok_or_else(|| AlistError::not_found("setting", key))
    }

    pub fn save_settings(&mut self, settings: &[Setting]) -> Result<Payload> {
        let body = serde_json::to_value(settings).map_err(|source| AlistError::UnexpectedPayload {
            expected: "serializable settings",
            source,
        })?;
        self.client.session.post("/admin/settings", RequestOptions::json(body))
    }

    pub fn delete_setting(&mut self, key: &str) -> Result<Payload> {
        self.client
            .session
            .delete("/admin/setting", RequestOptions::new().query("key", key))
    }

    /// Read a setting, or update it when `new` differs from the stored value.
    ///
    /// Returns the value in effect afterwards.
    pub fn get_or_update(&mut self, key: &str, new: Option<SettingValue>) -> Result<SettingValue> {
        let mut setting = self.setting(key)?;
        let old = setting.typed_value();
        let Some(new) = new else {
            return Ok(old);
        };
        let stored = setting.set_value(new)?;
        if stored == old {
            return Ok(old);
        }
        debug!("updating setting `{key}`");
        self.save_settings(std::slice::from_ref(&setting))?;
        Ok(stored)
    }

    /// One accessor per setting key, from a single fetch.
    pub fn setting_accessors(&mut self) -> Result<BTreeMap<String, SettingAccessor>> {
        Ok(self
            .settings(None)?
            .into_iter()
            .map(|s| {
                let key = s.key().to_string();
                (key.clone(), SettingAccessor { key })
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Drivers
    // -----------------------------------------------------------------------

    /// Refetch the driver catalog.
    pub fn drivers(&mut self) -> Result<&DriverRegistry> {
        self.client.drivers.fetch(&mut self.client.session)?;
        Ok(&self.client.drivers)
    }

    pub fn driver(&mut self, name: &str) -> Result<&Driver> {
        self.drivers()?.get(name)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    pub fn accounts(&mut self) -> Result<&[Account]> {
        self.client.accounts.fetch(&mut self.client.session)
    }

    pub fn account(&mut self, lookup: impl Into<Lookup>) -> Result<&Account> {
        self.accounts()?;
        self.client.accounts.find(lookup)
    }

    /// Create an account for `driver_type` after checking required fields.
    pub fn create_account(&mut self, driver_type: &str, mut fields: Map<String, Value>) -> Result<Payload> {
        fields.insert("type".to_string(), json!(driver_type));
        if !self.client.drivers.is_loaded() {
            self.client.drivers.fetch(&mut self.client.session)?;
        }
        self.client.drivers.validate_account(driver_type, &fields)?;

        fields.insert("updated_at".to_string(), json!(timestamp()));
        let account = Account::new(fields)?;
        self.client
            .session
            .post("/admin/account/create", RequestOptions::json(account.to_value()))
    }

    /// A local-disk account rooted at `root_folder`.
    pub fn create_native(&mut self, name: &str, root_folder: &str, extra: Map<String, Value>) -> Result<Payload> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("root_folder".to_string(), json!(root_folder));
        fields.insert("webdav_direct".to_string(), json!(false));
        fields.extend(extra);
        self.create_account("Native", fields)
    }

    /// An account mounting another alist server.
    pub fn create_alist(
        &mut self,
        name: &str,
        site_url: &str,
        access_token: &str,
        extra: Map<String, Value>,
    ) -> Result<Payload> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("site_url".to_string(), json!(site_url));
        fields.insert("access_token".to_string(), json!(access_token));
        fields.insert("proxy".to_string(), json!(false));
        fields.insert("webdav_proxy".to_string(), json!(false));
        fields.insert("webdav_direct".to_string(), json!(false));
        fields.extend(extra);
        self.create_account("Alist", fields)
    }

    pub fn create_onedrive(&mut self, account: OnedriveAccount, extra: Map<String, Value>) -> Result<Payload> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!(account.name));
        fields.insert("zone".to_string(), json!(account.zone));
        fields.insert("internal_type".to_string(), json!(account.internal_type));
        fields.insert("client_id".to_string(), json!(account.client_id));
        fields.insert("client_secret".to_string(), json!(account.client_secret));
        fields.insert("redirect_uri".to_string(), json!(account.redirect_uri));
        fields.insert("refresh_token".to_string(), json!(account.refresh_token));
        fields.insert("proxy".to_string(), json!(false));
        fields.insert("webdav_proxy".to_string(), json!(false));
        fields.insert("webdav_direct".to_string(), json!(false));
        fields.extend(extra);
        self.create_account("Onedrive", fields)
    }

    pub fn save_account(&mut self, account: &Account) -> Result<Payload> {
        self.client
            .session
            .post("/admin/account/save", RequestOptions::json(account.to_value()))
    }

    /// Delete the account with this id or name.
    pub fn delete_account(&mut self, lookup: impl Into<Lookup>) -> Result<Payload> {
        let id = id_param(self.account(lookup)?.id())?;
        self.client
            .session
            .delete("/admin/account", RequestOptions::new().query("id", id))
    }

    // -----------------------------------------------------------------------
    // Metas
    // -----------------------------------------------------------------------

    pub fn metas(&mut self) -> Result<&[Meta]> {
        self.client.metas.fetch(&mut self.client.session)
    }

    pub fn meta(&mut self, lookup: impl Into<Lookup>) -> Result<&Meta> {
        self.metas()?;
        self.client.metas.find(lookup)
    }

    pub fn create_meta(&mut self, draft: MetaDraft) -> Result<Payload> {
        let meta = draft.into_meta()?;
        self.client
            .session
            .post("/admin/meta/create", RequestOptions::json(meta.to_value()))
    }

    pub fn save_meta(&mut self, meta: &Meta) -> Result<Payload> {
        self.client
            .session
            .post("/admin/meta/save", RequestOptions::json(meta.to_value()))
    }

    /// Delete the meta with this id or path.
    pub fn delete_meta(&mut self, lookup: impl Into<Lookup>) -> Result<Payload> {
        let id = id_param(self.meta(lookup)?.id())?;
        self.client
            .session
            .delete("/admin/meta", RequestOptions::new().query("id", id))
    }

    // -----------------------------------------------------------------------
    // Files
    // -----------------------------------------------------------------------

    pub fn clear_cache(&mut self) -> Result<Payload> {
        self.client.session.get("/admin/clear_cache", RequestOptions::new())
    }

    /// Direct link of a file.
    pub fn link(&mut self, path: &str) -> Result<Payload> {
        self.post_json("/admin/link", json!({ "path": path }))
    }

    /// Delete `names` inside the directory `path`.
    pub fn delete_files(&mut self, path: &str, names: &[&str]) -> Result<Payload> {
        self.client.session.delete(
            "/admin/files",
            RequestOptions::json(json!({ "path": path, "names": names })),
        )
    }

    pub fn mkdir(&mut self, path: &str) -> Result<Payload> {
        self.post_json("/admin/mkdir", json!({ "path": path }))
    }

    pub fn rename(&mut self, path: &str, name: &str) -> Result<Payload> {
        self.post_json("/admin/rename", json!({ "path": path, "name": name }))
    }

    pub fn move_files(&mut self, src_dir: &str, dst_dir: &str, names: &[&str]) -> Result<Payload> {
        self.post_json(
            "/admin/move",
            json!({ "src_dir": src_dir, "dst_dir": dst_dir, "names": names }),
        )
    }

    pub fn copy_files(&mut self, src_dir: &str, dst_dir: &str, names: &[&str]) -> Result<Payload> {
        self.post_json(
            "/admin/copy",
            json!({ "src_dir": src_dir, "dst_dir": dst_dir, "names": names }),
        )
    }

    pub fn folder(&mut self, path: &str) -> Result<Payload> {
        self.post_json("/admin/folder", json!({ "path": path }))
    }

    /// Drop the server's cached listing of `path`.
    pub fn refresh(&mut self, path: &str) -> Result<Payload> {
        self.post_json("/admin/refresh", json!({ "path": path }))
    }

    fn post_json(&mut self, endpoint: &str, body: Value) -> Result<Payload> {
        self.client.session.post(endpoint, RequestOptions::json(body))
    }
}

/// Identity as a query parameter value.
fn id_param(id: Option<&Value>) -> Result<String> {
    match id {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(AlistError::InvalidValue {
            field: "id".to_string(),
            reason: format!("record has no usable id: {other:?}"),
        }),
    }
}

/// Local time, e.g. `2023-06-11T11:03:03.684818327+08:00`.
fn timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, false)
}
