//! Storage accounts.
//!
//! An account is one mounted storage backend. Its fields are the union of
//! every driver's configuration attributes; which of them matter depends on
//! the account's `type` (the driver name).

use serde_json::Value;

use crate::record::{Record, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSchema;

impl Schema for AccountSchema {
    const NAME: &'static str = "account";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "index",
        "type",
        "username",
        "password",
        "refresh_token",
        "access_token",
        "root_folder",
        "status",
        "CronId",
        "DriveId",
        "limit",
        "order_by",
        "order_direction",
        "updated_at",
        "search",
        "client_id",
        "client_secret",
        "zone",
        "redirect_uri",
        "site_url",
        "site_id",
        "internal_type",
        "webdav_proxy",
        "proxy",
        "webdav_direct",
        "down_proxy_url",
        "api_proxy_url",
        "bucket",
        "endpoint",
        "region",
        "access_key",
        "access_secret",
        "custom_host",
        "extract_folder",
        "bool_1",
        "algorithms",
        "client_version",
        "package_name",
        "user_agent",
        "captcha_token",
        "device_id",
    ];
    const IDENTITY: Option<&'static str> = Some("id");
    const SECONDARY_KEY: &'static str = "name";
}

pub type Account = Record<AccountSchema>;

impl Record<AccountSchema> {
    /// Mount path of the account, e.g. `/local`.
    pub fn name(&self) -> Option<&str> {
        self.secondary_key()
    }

    /// Driver name, e.g. `Native`.
    pub fn driver_type(&self) -> Option<&str> {
        self.as_map().get("type").and_then(Value::as_str)
    }
}
