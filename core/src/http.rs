//! HTTP types exchanged between the session and its transport.
//!
//! # Design
//! Requests and responses are plain data. The session builds an
//! `HttpRequest`, hands it to a `Transport`, and decodes the returned
//! `HttpResponse`; nothing in here touches the network. This keeps the
//! request builder and the envelope decoder deterministic and lets tests
//! substitute a recording transport.
//!
//! All fields use owned types so values can be stored, compared and
//! replayed without lifetime concerns.

use serde_json::Value;
use uuid::Uuid;

use crate::config::TlsOptions;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized by the transport, which also sets the content type.
    Json(Value),
    /// `multipart/form-data`, used only by uploads.
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub tls: TlsOptions,
}

impl HttpRequest {
    /// First header value whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// `charset` is the encoding the server declared in its `content-type`
/// header, if any. `body` is the raw, undecoded byte stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub charset: Option<String>,
}

impl HttpResponse {
    /// First header value whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// A `multipart/form-data` body with a random boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<FormPart>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("alist_form_{}", Uuid::new_v4().simple()),
            parts: Vec::new(),
        }
    }

    /// Append a plain text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            filename: None,
            data: value.as_bytes().to_vec(),
        });
        self
    }

    /// Append a file field.
    pub fn file(mut self, name: &str, filename: &str, data: Vec<u8>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            data,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize all parts into a single body.
    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let mut disposition = format!(
                "Content-Disposition: form-data; name=\"{}\"",
                escape_quoted(&part.name)
            );
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
            }
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            if part.filename.is_some() {
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        body
    }
}

fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}
