//! Authenticated request building.
//!
//! # Design
//! Every call carries a fixed set of informational headers that mirror what
//! the server's web UI sends (`Method`, `Path`, `Authority`, `Scheme`,
//! `Accept`, `Origin`) plus `Authorization` once a token is held. Caller
//! headers are merged first and the computed ones are written over them, so
//! a caller cannot override e.g. `Authorization` for a single request.
//! No `Content-Type` is set here; the transport derives it from the body.

use serde_json::Value;
use url::Url;

use crate::config::TlsOptions;
use crate::error::{AlistError, Result};
use crate::http::{HttpMethod, HttpRequest, MultipartForm, RequestBody};

/// Every endpoint lives under this path segment.
pub const API_ROOT: &str = "/api";

const ACCEPT: &str = "application/json, text/plain, */*";

/// Parsed form of the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    base_url: String,
    host: String,
    scheme: String,
}

impl Origin {
    pub fn parse(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/');
        let url = Url::parse(base_url).map_err(|e| AlistError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let host = url.host_str().ok_or_else(|| AlistError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "no host".to_string(),
        })?;
        Ok(Self {
            base_url: base_url.to_string(),
            host: host.to_string(),
            scheme: url.scheme().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Absolute URL of `endpoint`, e.g. `/admin/login`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, api_path(endpoint))
    }
}

/// `/api` + `endpoint`.
pub fn api_path(endpoint: &str) -> String {
    format!("{API_ROOT}{endpoint}")
}

/// Per-call extras supplied by the endpoint methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(body: Value) -> Self {
        Self {
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    pub fn multipart(form: MultipartForm) -> Self {
        Self {
            body: Some(RequestBody::Multipart(form)),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Build the request for `method endpoint`.
pub fn build_request(
    origin: &Origin,
    token: Option<&str>,
    tls: &TlsOptions,
    method: HttpMethod,
    endpoint: &str,
    options: RequestOptions,
) -> HttpRequest {
    let path = api_path(endpoint);
    let mut computed = vec![
        ("Method", method.as_str().to_string()),
        ("Path", path),
        ("Authority", origin.host.clone()),
        ("Scheme", origin.scheme.clone()),
        ("Accept", ACCEPT.to_string()),
        ("Origin", origin.base_url.clone()),
    ];
    if let Some(token) = token {
        computed.push(("Authorization", token.to_string()));
    }

    let mut headers = options.headers;
    for (name, value) in computed {
        match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => *slot = (name.to_string(), value),
            None => headers.push((name.to_string(), value)),
        }
    }

    HttpRequest {
        method,
        url: origin.endpoint_url(endpoint),
        query: options.query,
        headers,
        body: options.body,
        tls: tls.clone(),
    }
}
