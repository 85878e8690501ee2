//! Client behavior over a spy transport.
//!
//! # Design
//! The spy replays canned envelopes in order and records every request, so
//! each test can assert both what the client returned and exactly what it
//! put on the wire (or that it sent nothing at all).

use std::collections::VecDeque;
use std::io::Write;

use alist_core::error::TransportError;
use alist_core::http::RequestBody;
use alist_core::{
    AlistClient, AlistError, AuthState, ClientConfig, Credential, HttpMethod, HttpRequest, HttpResponse, MetaDraft,
    Page, Payload, RequestOptions, SettingValue, Transport,
};
use serde_json::{json, Map, Value};

#[derive(Default)]
struct Spy {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

impl Transport for Spy {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.push(request.clone());
        self.responses.pop_front().ok_or_else(|| "no response queued".into())
    }
}

fn envelope(code: i64, message: &str, data: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![("Content-Type".to_string(), "application/json; charset=utf-8".to_string())],
        body: json!({"code": code, "message": message, "data": data}).to_string().into_bytes(),
        charset: Some("utf-8".to_string()),
    }
}

fn ok(data: Value) -> HttpResponse {
    envelope(200, "success", data)
}

fn client(responses: Vec<HttpResponse>) -> AlistClient<Spy> {
    let spy = Spy {
        responses: responses.into(),
        requests: Vec::new(),
    };
    AlistClient::new(&ClientConfig::new("http://localhost:5244"), spy).unwrap()
}

fn requests(client: &AlistClient<Spy>) -> &[HttpRequest] {
    &client.session().transport().requests
}

fn json_body(request: &HttpRequest) -> &Value {
    match &request.body {
        Some(RequestBody::Json(value)) => value,
        other => panic!("expected a JSON body, got {other:?}"),
    }
}

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

fn driver_catalog() -> Value {
    json!({
        "Native": [
            {"name": "root_folder", "label": "root folder path", "type": "string", "required": true}
        ],
        "Onedrive": [
            {"name": "zone", "type": "select", "values": "global,cn", "required": true},
            {"name": "client_id", "type": "string", "required": true},
            {"name": "client_secret", "type": "string", "required": true},
            {"name": "redirect_uri", "type": "string", "required": true},
            {"name": "refresh_token", "type": "string", "required": true}
        ]
    })
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_is_idempotent() {
    let mut c = client(vec![ok(Value::Null)]);
    let credential = Credential::Secret("secret123".to_string());

    c.login(&credential).unwrap();
    assert!(c.is_login());
    assert_eq!(c.login(&credential).unwrap(), Payload::Success);

    assert_eq!(requests(&c).len(), 1);
    let login = &requests(&c)[0];
    assert_eq!(login.url, "http://localhost:5244/api/admin/login");
    assert_eq!(login.header("Authorization"), Some("336f0be87c1906982fda4cff92f498fd"));
}

#[test]
fn rejected_login_can_be_retried() {
    let mut c = client(vec![envelope(401, "password is incorrect", Value::Null), ok(Value::Null)]);

    let err = c.login(&Credential::Secret("wrong".to_string())).unwrap_err();
    assert_eq!(err.api_code(), Some(401));
    assert_eq!(c.session().state(), AuthState::Unauthenticated);
    assert_eq!(c.session().token(), None);

    c.login(&Credential::Token("d4b73d5893b7da0ecdff45c098012be6".to_string()))
        .unwrap();
    assert_eq!(c.session().state(), AuthState::Authenticated);
    assert_eq!(c.session().token(), Some("d4b73d5893b7da0ecdff45c098012be6"));
}

#[test]
fn transport_failure_is_wrapped() {
    let mut c = client(vec![]);
    let err = c.login(&Credential::Secret("x".to_string())).unwrap_err();
    assert!(matches!(err, AlistError::Transport(_)));
    assert!(!c.is_login());
}

#[test]
fn caller_cannot_override_authorization() {
    let mut c = client(vec![ok(Value::Null)]);
    c.login(&Credential::Secret("secret123".to_string())).unwrap();

    let req = c.session().build(
        HttpMethod::Get,
        "/admin/settings",
        RequestOptions::new().header("authorization", "mine").header("X-Trace", "1"),
    );
    assert_eq!(req.header("Authorization"), Some("336f0be87c1906982fda4cff92f498fd"));
    assert_eq!(req.header("X-Trace"), Some("1"));
    assert_eq!(req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("authorization")).count(), 1);
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[test]
fn missing_required_field_sends_nothing() {
    let mut c = client(vec![ok(driver_catalog())]);
    c.admin().drivers().unwrap();
    assert_eq!(requests(&c).len(), 1);

    let err = c
        .admin()
        .create_account(
            "Onedrive",
            fields(json!({"name": "/od", "zone": "global", "client_id": "id", "redirect_uri": "http://x"})),
        )
        .unwrap_err();
    match err {
        AlistError::MissingRequiredField { record, missing } => {
            assert_eq!(record, "Onedrive");
            assert_eq!(missing, vec!["client_secret".to_string(), "refresh_token".to_string()]);
        }
        other => panic!("expected MissingRequiredField, got {other:?}"),
    }
    assert_eq!(requests(&c).len(), 1);
}

#[test]
fn unknown_driver_is_not_found() {
    let mut c = client(vec![ok(driver_catalog())]);
    let err = c.admin().create_account("FTP", fields(json!({"name": "/ftp"}))).unwrap_err();
    assert!(matches!(err, AlistError::NotFound { kind: "driver", .. }));
    assert_eq!(requests(&c).len(), 1);
}

#[test]
fn create_native_fetches_catalog_once() {
    let mut c = client(vec![ok(driver_catalog()), ok(Value::Null), ok(Value::Null)]);

    c.admin().create_native("/local", "/srv/files", Map::new()).unwrap();
    c.admin().create_native("/other", "/srv/other", Map::new()).unwrap();

    let sent = requests(&c);
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].url, "http://localhost:5244/api/admin/drivers");
    assert_eq!(sent[1].method, HttpMethod::Post);
    assert_eq!(sent[1].url, "http://localhost:5244/api/admin/account/create");

    let body = json_body(&sent[1]);
    assert_eq!(body["type"], "Native");
    assert_eq!(body["name"], "/local");
    assert_eq!(body["root_folder"], "/srv/files");
    assert!(body["updated_at"].as_str().is_some_and(|ts| ts.contains('T')));
    assert_eq!(body["client_id"], Value::Null);
}

#[test]
fn delete_account_by_name_uses_identity() {
    let listing = json!([
        {"id": 1, "name": "/a", "type": "Native"},
        {"id": 2, "name": "/b", "type": "Native"}
    ]);
    let mut c = client(vec![ok(listing), ok(Value::Null)]);

    c.admin().delete_account("/b").unwrap();

    let sent = requests(&c);
    assert_eq!(sent[0].url, "http://localhost:5244/api/admin/accounts");
    assert_eq!(sent[1].method, HttpMethod::Delete);
    assert_eq!(sent[1].url, "http://localhost:5244/api/admin/account");
    assert_eq!(sent[1].query, vec![("id".to_string(), "2".to_string())]);
}

#[test]
fn account_lookup_refetches() {
    let first = json!([{"id": 1, "name": "/a"}]);
    let second = json!([{"id": 1, "name": "/a"}, {"id": 5, "name": "/new"}]);
    let mut c = client(vec![ok(first), ok(second)]);

    assert!(matches!(c.admin().account("/new"), Err(AlistError::NotFound { kind: "account", .. })));
    assert_eq!(c.admin().account(5i64).unwrap().name(), Some("/new"));
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

fn settings_listing() -> Value {
    json!([
        {"key": "title", "value": "Alist", "type": "string", "group": 0},
        {"key": "enable search", "value": "false", "type": "bool", "group": 1},
        {"key": "text types", "value": "txt,htm", "type": "text", "group": 2}
    ])
}

#[test]
fn get_or_update_skips_unchanged_values() {
    let mut c = client(vec![ok(settings_listing()), ok(settings_listing())]);

    assert_eq!(c.admin().get_or_update("enable search", None).unwrap(), SettingValue::Bool(false));
    assert_eq!(
        c.admin().get_or_update("enable search", Some(false.into())).unwrap(),
        SettingValue::Bool(false)
    );
    assert_eq!(requests(&c).len(), 2);
}

#[test]
fn get_or_update_saves_changed_values() {
    let mut c = client(vec![ok(settings_listing()), ok(Value::Null)]);

    let value = c.admin().get_or_update("enable search", Some(true.into())).unwrap();
    assert_eq!(value, SettingValue::Bool(true));

    let save = &requests(&c)[1];
    assert_eq!(save.url, "http://localhost:5244/api/admin/settings");
    let body = json_body(save);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["key"], "enable search");
    assert_eq!(body[0]["value"], "true");
}

#[test]
fn invalid_setting_value_sends_nothing_more() {
    let mut c = client(vec![ok(settings_listing())]);
    let err = c.admin().get_or_update("enable search", Some("maybe".into())).unwrap_err();
    assert!(matches!(err, AlistError::InvalidValue { .. }));
    assert_eq!(requests(&c).len(), 1);
}

#[test]
fn settings_group_goes_in_the_query() {
    let mut c = client(vec![ok(settings_listing())]);
    c.admin().backend().unwrap();
    assert_eq!(requests(&c)[0].query, vec![("group".to_string(), "1".to_string())]);
}

#[test]
fn accessors_cover_every_key() {
    let mut c = client(vec![ok(settings_listing()), ok(settings_listing())]);
    let accessors = c.admin().setting_accessors().unwrap();
    assert_eq!(accessors.keys().collect::<Vec<_>>(), vec!["enable search", "text types", "title"]);

    let title = &accessors["title"];
    let mut admin = c.admin();
    assert_eq!(title.get(&mut admin).unwrap(), SettingValue::Text("Alist".to_string()));
}

// ---------------------------------------------------------------------------
// Metas and files
// ---------------------------------------------------------------------------

#[test]
fn create_meta_joins_lists() {
    let mut c = client(vec![ok(Value::Null)]);
    let draft = MetaDraft {
        hide: Some(vec!["*.tmp".to_string(), "README.md".to_string()]),
        upload: true,
        ..MetaDraft::new("/public")
    };
    c.admin().create_meta(draft).unwrap();

    let body = json_body(&requests(&c)[0]);
    assert_eq!(body["path"], "/public");
    assert_eq!(body["hide"], "*.tmp,README.md");
    assert_eq!(body["upload"], true);
}

#[test]
fn delete_files_sends_json_with_delete() {
    let mut c = client(vec![ok(Value::Null)]);
    c.admin().delete_files("/local", &["a.txt", "b.txt"]).unwrap();

    let req = &requests(&c)[0];
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(json_body(req), &json!({"path": "/local", "names": ["a.txt", "b.txt"]}));
}

#[test]
fn public_path_carries_paging() {
    let mut c = client(vec![ok(json!({"type": "folder", "files": []}))]);
    let payload = c.public().path("/", None, Page::default()).unwrap();
    assert_eq!(payload.as_data().unwrap()["type"], "folder");
    assert_eq!(
        json_body(&requests(&c)[0]),
        &json!({"path": "/", "password": null, "page_num": 1, "page_size": 30})
    );
}

#[test]
fn upload_sends_basename_parts() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello").unwrap();
    let name = file.path().file_name().unwrap().to_string_lossy().into_owned();

    let mut c = client(vec![ok(Value::Null)]);
    c.public().upload(&[file.path()], "/public", None).unwrap();

    let req = &requests(&c)[0];
    assert_eq!(req.url, "http://localhost:5244/api/public/upload");
    let Some(RequestBody::Multipart(form)) = &req.body else {
        panic!("expected multipart body");
    };
    let parts = form.parts();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].name, "files");
    assert_eq!(parts[0].filename.as_deref(), Some(name.as_str()));
    assert_eq!(parts[0].data, b"hello");
    assert_eq!(parts[1].name, "path");
    assert_eq!(parts[1].data, b"/public");
}

#[test]
fn upload_of_missing_file_is_io_error() {
    let mut c = client(vec![]);
    let err = c
        .public()
        .upload(&["/definitely/not/here.bin"], "/", None)
        .unwrap_err();
    assert!(matches!(err, AlistError::Io(_)));
    assert!(requests(&c).is_empty());
}

#[test]
fn preview_and_link_post_the_path() {
    let mut c = client(vec![ok(json!({"url": "/p/a.txt"})), ok(json!({"url": "/d/a.txt"}))]);
    c.public().preview("/a.txt").unwrap();
    c.admin().link("/a.txt").unwrap();

    let sent = requests(&c);
    assert_eq!(sent[0].url, "http://localhost:5244/api/public/preview");
    assert_eq!(sent[1].url, "http://localhost:5244/api/admin/link");
    assert!(sent.iter().all(|r| json_body(r) == &json!({"path": "/a.txt"})));
}

#[test]
fn create_onedrive_fills_driver_fields() {
    let mut c = client(vec![ok(driver_catalog()), ok(Value::Null)]);
    let account = alist_core::OnedriveAccount {
        name: "/od".to_string(),
        zone: "global".to_string(),
        internal_type: "onedrive".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "https://example.com/callback".to_string(),
        refresh_token: "refresh".to_string(),
    };
    let mut extra = Map::new();
    extra.insert("order_by".to_string(), json!("name"));
    c.admin().create_onedrive(account, extra).unwrap();

    let body = json_body(&requests(&c)[1]);
    assert_eq!(body["type"], "Onedrive");
    assert_eq!(body["client_secret"], "secret");
    assert_eq!(body["order_by"], "name");
    assert_eq!(body["webdav_proxy"], false);
}

#[test]
fn create_alist_is_validated_against_its_driver() {
    let catalog = json!({
        "Alist": [
            {"name": "site_url", "type": "string", "required": true},
            {"name": "access_token", "type": "string", "required": true}
        ]
    });
    let mut c = client(vec![ok(catalog), ok(Value::Null)]);
    c.admin()
        .create_alist("/remote", "https://other.example.com", "token", Map::new())
        .unwrap();
    assert_eq!(json_body(&requests(&c)[1])["site_url"], "https://other.example.com");
}

#[test]
fn delete_setting_uses_key_query() {
    let mut c = client(vec![ok(Value::Null)]);
    c.admin().delete_setting("customize head").unwrap();

    let req = &requests(&c)[0];
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, "http://localhost:5244/api/admin/setting");
    assert_eq!(req.query, vec![("key".to_string(), "customize head".to_string())]);
    assert!(req.body.is_none());
}

#[test]
fn api_error_keeps_the_response() {
    let mut c = client(vec![envelope(500, "record not found", Value::Null)]);
    match c.admin().clear_cache().unwrap_err() {
        AlistError::Api { code, message, response } => {
            assert_eq!(code, 500);
            assert_eq!(message, "record not found");
            assert_eq!(response.status, 200);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
