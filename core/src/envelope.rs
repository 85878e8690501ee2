//! Response envelope decoding.
//!
//! # Design
//! Every JSON reply from the server is wrapped as
//! `{"code": int, "message": string, "data": any|null}`. `decode` is the only
//! place that interprets raw responses, so the rest of the crate deals with
//! `Payload` values or `AlistError::Api`. Non-JSON bodies (downloads, plain
//! text) and empty bodies pass through without parsing.

use log::{trace, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AlistError, Result};
use crate::http::HttpResponse;

const SUCCESS_CODE: i64 = 200;

/// The decoded result of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body was empty after trimming whitespace.
    Empty,
    /// Non-JSON body decoded as text.
    Text(String),
    /// Non-JSON body without a declared charset that is not valid UTF-8.
    Binary(Vec<u8>),
    /// Envelope succeeded with `data: null`.
    Success,
    /// Envelope succeeded with a payload.
    Data(Value),
}

impl Payload {
    /// Whether this payload is the generic success marker.
    pub fn is_success(&self) -> bool {
        matches!(self, Payload::Success)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Payload::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Deserialize the envelope's `data`. `Success` reads as JSON `null`.
    pub fn into_data<T: DeserializeOwned>(self, expected: &'static str) -> Result<T> {
        let value = match self {
            Payload::Data(value) => value,
            Payload::Text(text) => Value::String(text),
            Payload::Success | Payload::Empty | Payload::Binary(_) => Value::Null,
        };
        serde_json::from_value(value).map_err(|source| AlistError::UnexpectedPayload { expected, source })
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// Interpret a raw response.
///
/// - empty body: `Payload::Empty`
/// - `content-type` other than `application/json`: `Payload::Text` / `Payload::Binary`
/// - unparsable JSON: `AlistError::MalformedPayload`
/// - `code != 200`: `AlistError::Api`, carrying `response`
/// - `data: null`: `Payload::Success`, else `Payload::Data`
pub fn decode(response: HttpResponse) -> Result<Payload> {
    trace!("decoding response with status {}", response.status);
    let body = response.body.trim_ascii();
    if body.is_empty() {
        return Ok(Payload::Empty);
    }
    let text = decode_text(body, response.charset.as_deref());

    if !is_json(response.header("content-type")) {
        return Ok(match text {
            Ok(text) => Payload::Text(text),
            Err(bytes) => Payload::Binary(bytes),
        });
    }

    let parsed = match &text {
        Ok(text) => serde_json::from_str::<Envelope>(text),
        Err(bytes) => serde_json::from_slice::<Envelope>(bytes),
    };
    let envelope = parsed.map_err(|source| AlistError::MalformedPayload {
        text: match text {
            Ok(text) => text,
            Err(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        },
        source,
    })?;

    if envelope.code != SUCCESS_CODE {
        return Err(AlistError::Api {
            code: envelope.code,
            message: envelope.message,
            response: Box::new(response),
        });
    }
    Ok(match envelope.data {
        Value::Null => Payload::Success,
        data => Payload::Data(data),
    })
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|primary| primary.trim().eq_ignore_ascii_case("application/json"))
}

/// Decode `body` with the declared charset. Without one, the bytes are kept
/// as they are: valid UTF-8 is text, anything else is returned as `Err`.
fn decode_text(body: &[u8], charset: Option<&str>) -> std::result::Result<String, Vec<u8>> {
    let Some(charset) = charset else {
        return String::from_utf8(body.to_vec()).map_err(|e| e.into_bytes());
    };
    match charset.trim().to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => Ok(String::from_utf8_lossy(body).into_owned()),
        "iso-8859-1" | "latin1" | "latin-1" => Ok(body.iter().map(|&b| b as char).collect()),
        other => {
            warn!("unsupported charset `{other}`, decoding as utf-8");
            Ok(String::from_utf8_lossy(body).into_owned())
        }
    }
}
