//! In-memory stand-in for an alist v2 server.
//!
//! Speaks the same envelope (`{code, message, data}`) and token scheme as the
//! real server for the endpoints the client uses. Everything lives in one
//! `Store` behind a lock and is lost on restart.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use log::{debug, info};
use md5::{Digest, Md5};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_PASSWORD: &str = "alist-admin";

const TOKEN_PREFIX: &str = "https://github.com/Xhofe/alist-";

/// Server options.
#[derive(Clone, Debug)]
pub struct MockConfig {
    /// Admin password; clients authenticate with its derived token.
    pub password: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// `hex(md5(prefix + password))`, the only token the server accepts.
pub fn token_for(password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(TOKEN_PREFIX.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// A file or folder. Folders have no size.
#[derive(Clone, Debug, PartialEq)]
struct Entry {
    size: Option<u64>,
}

#[derive(Debug)]
struct Store {
    settings: Vec<Value>,
    accounts: Vec<Value>,
    metas: Vec<Value>,
    files: BTreeMap<String, Entry>,
    next_id: i64,
}

impl Store {
    fn new() -> Self {
        Self {
            settings: default_settings(),
            accounts: Vec::new(),
            metas: Vec::new(),
            files: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn assign_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn exists(&self, path: &str) -> bool {
        path == "/" || self.files.contains_key(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        path == "/" || self.files.get(path).is_some_and(|e| e.size.is_none())
    }

    /// Direct children of `dir`, sorted by name.
    fn children(&self, dir: &str) -> Vec<(String, Entry)> {
        self.files
            .iter()
            .filter(|(path, _)| parent(path) == dir)
            .map(|(path, entry)| (basename(path).to_string(), entry.clone()))
            .collect()
    }

    /// Create `path` and any missing parent folders.
    fn mkdir_all(&mut self, path: &str) {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = join(&current, segment);
            self.files.entry(current.clone()).or_insert(Entry { size: None });
        }
    }

    /// Remove `path` and everything below it.
    fn remove_tree(&mut self, path: &str) -> bool {
        let prefix = format!("{path}/");
        let removed = self.files.remove(path).is_some();
        self.files.retain(|p, _| !p.starts_with(&prefix));
        removed
    }

    /// Copy `src` (and its subtree) to `dst`.
    fn copy_tree(&mut self, src: &str, dst: &str) {
        let prefix = format!("{src}/");
        let copies: Vec<(String, Entry)> = self
            .files
            .iter()
            .filter(|(p, _)| p.as_str() == src || p.starts_with(&prefix))
            .map(|(p, e)| (format!("{dst}{}", &p[src.len()..]), e.clone()))
            .collect();
        self.files.extend(copies);
    }

    fn meta_for(&self, path: &str) -> Option<&Value> {
        self.metas.iter().find(|m| m["path"] == path)
    }

    fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.iter().find(|s| s["key"] == key)
    }
}

#[derive(Clone)]
struct AppState {
    db: Arc<RwLock<Store>>,
    token: String,
}

type Reply = (StatusCode, Json<Value>);

fn reply(status: StatusCode, message: &str, data: Value) -> Reply {
    (
        status,
        Json(json!({ "code": status.as_u16(), "message": message, "data": data })),
    )
}

fn success(data: Value) -> Reply {
    reply(StatusCode::OK, "success", data)
}

fn bad_request(message: &str) -> Reply {
    reply(StatusCode::BAD_REQUEST, message, Value::Null)
}

impl AppState {
    fn is_admin(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|t| t == self.token)
    }

    fn require_admin(&self, headers: &HeaderMap) -> Result<(), Reply> {
        if self.is_admin(headers) {
            Ok(())
        } else {
            Err(reply(StatusCode::UNAUTHORIZED, "password is incorrect", Value::Null))
        }
    }
}

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::new())),
        token: token_for(&config.password),
    };
    Router::new()
        .route("/api/admin/login", get(login))
        .route("/api/admin/settings", get(list_settings).post(save_settings))
        .route("/api/admin/setting", delete(delete_setting))
        .route("/api/admin/drivers", get(drivers))
        .route("/api/admin/accounts", get(list_accounts))
        .route("/api/admin/account/create", post(create_account))
        .route("/api/admin/account/save", post(save_account))
        .route("/api/admin/account", delete(delete_account))
        .route("/api/admin/metas", get(list_metas))
        .route("/api/admin/meta/create", post(create_meta))
        .route("/api/admin/meta/save", post(save_meta))
        .route("/api/admin/meta", delete(delete_meta))
        .route("/api/admin/clear_cache", get(clear_cache))
        .route("/api/admin/link", post(link))
        .route("/api/admin/files", delete(delete_files))
        .route("/api/admin/mkdir", post(mkdir))
        .route("/api/admin/rename", post(rename))
        .route("/api/admin/move", post(move_files))
        .route("/api/admin/copy", post(copy_files))
        .route("/api/admin/folder", post(folder))
        .route("/api/admin/refresh", post(refresh))
        .route("/api/public/path", post(public_path))
        .route("/api/public/preview", post(preview))
        .route("/api/public/search", post(search))
        .route("/api/public/upload", post(upload))
        .route("/api/public/settings", get(public_settings))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("serving on {addr}");
    }
    axum::serve(listener, app(config)).await
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn join(dir: &str, name: &str) -> String {
    if dir == "/" || dir.is_empty() {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

fn entry_json(name: &str, entry: &Entry) -> Value {
    json!({
        "name": name,
        "size": entry.size.unwrap_or(0),
        "type": if entry.size.is_none() { 1 } else { 0 },
    })
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

fn setting(key: &str, value: &str, kind: &str, group: u8, values: &str) -> Value {
    json!({
        "key": key,
        "value": value,
        "description": "",
        "type": kind,
        "group": group,
        "access": 0,
        "values": values,
        "version": "v2.6.4",
    })
}

fn default_settings() -> Vec<Value> {
    vec![
        setting("title", "Alist", "string", 0, ""),
        setting("load type", "all", "select", 0, "all,load more,auto load more,pagination"),
        setting("enable search", "false", "bool", 1, ""),
        setting("text types", "txt,htm,html,md,json", "text", 1, ""),
        setting("customize head", "", "text", 2, ""),
    ]
}

fn driver_catalog() -> Value {
    json!({
        "Native": [
            {"name": "root_folder", "label": "root folder path", "type": "string", "required": true, "default": "", "values": "", "description": ""},
            {"name": "order_by", "label": "order_by", "type": "select", "required": false, "default": "", "values": "name,size,updated_at", "description": ""}
        ],
        "Alist": [
            {"name": "site_url", "label": "alist site url", "type": "string", "required": true, "default": "", "values": "", "description": ""},
            {"name": "access_token", "label": "token", "type": "string", "required": true, "default": "", "values": "", "description": "admin token"},
            {"name": "root_folder", "label": "root folder path", "type": "string", "required": false, "default": "/", "values": "", "description": ""}
        ],
        "Onedrive": [
            {"name": "zone", "label": "", "type": "select", "required": true, "default": "global", "values": "global,cn,us,de", "description": ""},
            {"name": "internal_type", "label": "onedrive type", "type": "select", "required": true, "default": "onedrive", "values": "onedrive,sharepoint", "description": ""},
            {"name": "client_id", "label": "client id", "type": "string", "required": true, "default": "", "values": "", "description": ""},
            {"name": "client_secret", "label": "client secret", "type": "string", "required": true, "default": "", "values": "", "description": ""},
            {"name": "redirect_uri", "label": "redirect uri", "type": "string", "required": true, "default": "https://tool.nn.ci/onedrive/callback", "values": "", "description": ""},
            {"name": "refresh_token", "label": "refresh token", "type": "string", "required": true, "default": "", "values": "", "description": ""}
        ]
    })
}

// ---------------------------------------------------------------------------
// Admin: login and settings
// ---------------------------------------------------------------------------

async fn login(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    match state.require_admin(&headers) {
        Ok(()) => success(Value::Null),
        Err(denied) => denied,
    }
}

#[derive(Deserialize)]
pub struct SettingsQuery {
    pub group: Option<u8>,
}

async fn list_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SettingsQuery>,
) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let store = state.db.read().await;
    let settings: Vec<Value> = store
        .settings
        .iter()
        .filter(|s| query.group.map_or(true, |g| s["group"] == g))
        .cloned()
        .collect();
    success(json!(settings))
}

async fn save_settings(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<Vec<Value>>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    for update in input {
        let Some(existing) = store.settings.iter_mut().find(|s| s["key"] == update["key"]) else {
            return bad_request(&format!("setting {} not found", update["key"]));
        };
        debug!("setting {} = {}", update["key"], update["value"]);
        existing["value"] = update["value"].clone();
    }
    success(Value::Null)
}

#[derive(Deserialize)]
pub struct KeyQuery {
    pub key: String,
}

async fn delete_setting(State(state): State<AppState>, headers: HeaderMap, Query(query): Query<KeyQuery>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    let before = store.settings.len();
    store.settings.retain(|s| s["key"] != query.key.as_str());
    if store.settings.len() == before {
        return bad_request("record not found");
    }
    success(Value::Null)
}

async fn drivers(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    match state.require_admin(&headers) {
        Ok(()) => success(driver_catalog()),
        Err(denied) => denied,
    }
}

// ---------------------------------------------------------------------------
// Admin: accounts and metas
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

async fn list_accounts(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let store = state.db.read().await;
    success(json!(store.accounts))
}

async fn create_account(State(state): State<AppState>, headers: HeaderMap, Json(mut input): Json<Value>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let catalog = driver_catalog();
    let Some(attrs) = input["type"].as_str().and_then(|t| catalog[t].as_array()) else {
        return bad_request("no [type] driver");
    };
    for attr in attrs.iter().filter(|a| a["required"] == true) {
        if input[attr["name"].as_str().unwrap_or_default()].is_null() {
            return bad_request(&format!("{} is required", attr["name"]));
        }
    }
    let name = input["name"].as_str().unwrap_or_default().to_string();
    if name.is_empty() {
        return bad_request("name is required");
    }

    let mut store = state.db.write().await;
    if store.accounts.iter().any(|a| a["name"] == name.as_str()) {
        return bad_request("name already exists");
    }
    input["id"] = json!(store.assign_id());
    input["status"] = json!("work");
    info!("created account {name}");
    store.accounts.push(input);
    success(Value::Null)
}

async fn save_account(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<Value>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    match store.accounts.iter_mut().find(|a| a["id"] == input["id"]) {
        Some(existing) => {
            *existing = input;
            success(Value::Null)
        }
        None => bad_request("record not found"),
    }
}

async fn delete_account(State(state): State<AppState>, headers: HeaderMap, Query(query): Query<IdQuery>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    let before = store.accounts.len();
    store.accounts.retain(|a| a["id"] != query.id);
    if store.accounts.len() == before {
        return bad_request("record not found");
    }
    success(Value::Null)
}

async fn list_metas(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let store = state.db.read().await;
    success(json!(store.metas))
}

async fn create_meta(State(state): State<AppState>, headers: HeaderMap, Json(mut input): Json<Value>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let Some(path) = input["path"].as_str().map(normalize) else {
        return bad_request("path is required");
    };
    let mut store = state.db.write().await;
    if store.meta_for(&path).is_some() {
        return bad_request("path already exists");
    }
    input["path"] = json!(path);
    input["id"] = json!(store.assign_id());
    store.metas.push(input);
    success(Value::Null)
}

async fn save_meta(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<Value>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    match store.metas.iter_mut().find(|m| m["id"] == input["id"]) {
        Some(existing) => {
            *existing = input;
            success(Value::Null)
        }
        None => bad_request("record not found"),
    }
}

async fn delete_meta(State(state): State<AppState>, headers: HeaderMap, Query(query): Query<IdQuery>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let mut store = state.db.write().await;
    let before = store.metas.len();
    store.metas.retain(|m| m["id"] != query.id);
    if store.metas.len() == before {
        return bad_request("record not found");
    }
    success(Value::Null)
}

// ---------------------------------------------------------------------------
// Admin: files
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PathInput {
    pub path: String,
}

#[derive(Deserialize)]
pub struct NamesInput {
    pub path: String,
    pub names: Vec<String>,
}

#[derive(Deserialize)]
pub struct RenameInput {
    pub path: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct TransferInput {
    pub src_dir: String,
    pub dst_dir: String,
    pub names: Vec<String>,
}

async fn clear_cache(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    match state.require_admin(&headers) {
        Ok(()) => success(Value::Null),
        Err(denied) => denied,
    }
}

async fn link(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<PathInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let path = normalize(&input.path);
    let store = state.db.read().await;
    if !store.exists(&path) || store.is_dir(&path) {
        return bad_request("file not found");
    }
    success(json!({ "url": format!("/d{path}"), "headers": [] }))
}

async fn delete_files(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<NamesInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let dir = normalize(&input.path);
    let mut store = state.db.write().await;
    for name in &input.names {
        if !store.remove_tree(&join(&dir, name)) {
            return bad_request(&format!("{name} not found"));
        }
    }
    success(Value::Null)
}

async fn mkdir(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<PathInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    state.db.write().await.mkdir_all(&normalize(&input.path));
    success(Value::Null)
}

async fn rename(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<RenameInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let src = normalize(&input.path);
    let dst = join(parent(&src), &input.name);
    let mut store = state.db.write().await;
    if src == "/" || !store.exists(&src) {
        return bad_request("file not found");
    }
    if store.exists(&dst) {
        return bad_request("file already exists");
    }
    store.copy_tree(&src, &dst);
    store.remove_tree(&src);
    success(Value::Null)
}

async fn transfer(state: AppState, headers: HeaderMap, input: TransferInput, keep_source: bool) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let src_dir = normalize(&input.src_dir);
    let dst_dir = normalize(&input.dst_dir);
    let mut store = state.db.write().await;
    if !store.is_dir(&dst_dir) {
        return bad_request("destination is not a folder");
    }
    for name in &input.names {
        let src = join(&src_dir, name);
        if !store.exists(&src) {
            return bad_request(&format!("{name} not found"));
        }
        store.copy_tree(&src, &join(&dst_dir, name));
        if !keep_source {
            store.remove_tree(&src);
        }
    }
    success(Value::Null)
}

async fn move_files(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<TransferInput>) -> Reply {
    transfer(state, headers, input, false).await
}

async fn copy_files(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<TransferInput>) -> Reply {
    transfer(state, headers, input, true).await
}

async fn folder(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<PathInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let dir = normalize(&input.path);
    let store = state.db.read().await;
    if !store.is_dir(&dir) {
        return bad_request("not a folder");
    }
    let folders: Vec<Value> = store
        .children(&dir)
        .iter()
        .filter(|(_, e)| e.size.is_none())
        .map(|(name, e)| entry_json(name, e))
        .collect();
    success(json!(folders))
}

async fn refresh(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<PathInput>) -> Reply {
    if let Err(denied) = state.require_admin(&headers) {
        return denied;
    }
    let store = state.db.read().await;
    if !store.is_dir(&normalize(&input.path)) {
        return bad_request("not a folder");
    }
    success(Value::Null)
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ListInput {
    pub path: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub page_num: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchInput {
    pub path: String,
    pub keyword: String,
}

/// The meta password guarding `path`, if any.
fn guarded_by(store: &Store, path: &str) -> Option<String> {
    store
        .meta_for(path)
        .and_then(|m| m["password"].as_str())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

async fn public_path(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<ListInput>) -> Reply {
    let path = normalize(&input.path);
    let store = state.db.read().await;
    if !store.exists(&path) {
        return reply(StatusCode::NOT_FOUND, "path not found", Value::Null);
    }
    if let Some(expected) = guarded_by(&store, &path) {
        if !state.is_admin(&headers) && input.password.as_deref() != Some(expected.as_str()) {
            return reply(StatusCode::UNAUTHORIZED, "Wrong password", Value::Null);
        }
    }

    if !store.is_dir(&path) {
        let entry = &store.files[&path];
        return success(json!({ "type": "file", "files": [entry_json(basename(&path), entry)] }));
    }
    let page_num = input.page_num.unwrap_or(1).max(1);
    let page_size = input.page_size.unwrap_or(30).max(1);
    let children = store.children(&path);
    let files: Vec<Value> = children
        .iter()
        .skip((page_num - 1) * page_size)
        .take(page_size)
        .map(|(name, e)| entry_json(name, e))
        .collect();
    let readme = store.meta_for(&path).map(|m| m["readme"].clone()).unwrap_or(Value::Null);
    success(json!({ "type": "folder", "total": children.len(), "files": files, "readme": readme }))
}

async fn preview(State(state): State<AppState>, Json(input): Json<PathInput>) -> Reply {
    let path = normalize(&input.path);
    let store = state.db.read().await;
    if !store.exists(&path) || store.is_dir(&path) {
        return bad_request("file not found");
    }
    success(json!({ "url": format!("/p{path}") }))
}

async fn search(State(state): State<AppState>, Json(input): Json<SearchInput>) -> Reply {
    let store = state.db.read().await;
    if store.setting("enable search").map(|s| s["value"] == "true") != Some(true) {
        return bad_request("Not allowed search");
    }
    let root = normalize(&input.path);
    let prefix = if root == "/" { "/".to_string() } else { format!("{root}/") };
    let hits: Vec<Value> = store
        .files
        .iter()
        .filter(|(p, _)| p.starts_with(&prefix) && basename(p).contains(&input.keyword))
        .map(|(p, e)| {
            let mut hit = entry_json(basename(p), e);
            hit["path"] = json!(parent(p));
            hit
        })
        .collect();
    success(json!(hits))
}

async fn upload(State(state): State<AppState>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    let mut files: Vec<(String, u64)> = Vec::new();
    let mut path = None;
    let mut password = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(&e.body_text()),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return bad_request(&e.body_text()),
        };
        match (name.as_str(), file_name) {
            ("files", Some(file_name)) => files.push((file_name, data.len() as u64)),
            ("path", _) => path = Some(String::from_utf8_lossy(&data).into_owned()),
            ("password", _) => password = Some(String::from_utf8_lossy(&data).into_owned()),
            _ => {}
        }
    }

    let Some(dir) = path.as_deref().map(normalize) else {
        return bad_request("path is required");
    };
    let mut store = state.db.write().await;
    if !state.is_admin(&headers) {
        let Some(meta) = store.meta_for(&dir) else {
            return reply(StatusCode::UNAUTHORIZED, "Not allowed upload", Value::Null);
        };
        if meta["upload"] != true {
            return reply(StatusCode::UNAUTHORIZED, "Not allowed upload", Value::Null);
        }
        if let Some(expected) = guarded_by(&store, &dir) {
            if password.as_deref() != Some(expected.as_str()) {
                return reply(StatusCode::UNAUTHORIZED, "Wrong password", Value::Null);
            }
        }
    }
    store.mkdir_all(&dir);
    for (name, size) in files {
        debug!("uploaded {name} ({size} bytes) to {dir}");
        store.files.insert(join(&dir, &name), Entry { size: Some(size) });
    }
    success(Value::Null)
}

async fn public_settings(State(state): State<AppState>) -> Reply {
    let store = state.db.read().await;
    let settings: Vec<Value> = store.settings.iter().filter(|s| s["group"] == 0).cloned().collect();
    success(json!(settings))
}
