//! Error types for the alist client.
//!
//! # Design
//! One enum covers the whole pipeline so every public operation returns
//! `Result<T, AlistError>`. Transport failures are boxed and carried through
//! untouched; callers can downcast them to the transport's own error type
//! (`ureq::Error` for `UreqTransport`). Envelope failures keep the original
//! `HttpResponse` so HTTP-level data stays inspectable.

use thiserror::Error;

use crate::http::HttpResponse;

/// Convenience alias used throughout the crate.
pub type Result<T, E = AlistError> = std::result::Result<T, E>;

/// Error produced by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the client, its records and its collections.
#[derive(Debug, Error)]
pub enum AlistError {
    /// Network, TLS or DNS failure reported by the transport.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The body was declared as JSON but could not be read as an envelope.
    #[error("invalid json content: {text}")]
    MalformedPayload {
        text: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with an envelope whose `code` is not 200.
    #[error("server returned code {code}: {message}")]
    Api {
        code: i64,
        message: String,
        response: Box<HttpResponse>,
    },

    /// A record field outside the declared schema was read or written.
    #[error("{record} has no field `{field}`")]
    UnknownField { record: &'static str, field: String },

    /// A record field that is fixed after construction was written.
    #[error("{record} field `{field}` is read-only")]
    ImmutableField { record: &'static str, field: String },

    /// A value failed the field's type-specific coercion.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Required fields were not supplied. Raised before any request is sent.
    #[error("{record} must set {}", .missing.join(","))]
    MissingRequiredField { record: String, missing: Vec<String> },

    /// A lookup by identity or key found nothing.
    #[error("{kind} `{key}` not found")]
    NotFound { kind: &'static str, key: String },

    /// Record fields can never be removed.
    #[error("can't delete field `{field}` of {record}")]
    DeletionRejected { record: &'static str, field: String },

    /// A successful payload did not have the shape the operation expects.
    #[error("unexpected payload, expected {expected}: {source}")]
    UnexpectedPayload {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot be used.
    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Reading a local file (upload source, certificate) failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AlistError {
    /// The server's envelope code, when this is an `Api` error.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            AlistError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn not_found(kind: &'static str, key: impl ToString) -> Self {
        AlistError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_lists_every_name() {
        let err = AlistError::MissingRequiredField {
            record: "Onedrive".to_string(),
            missing: vec!["client_secret".to_string(), "name".to_string()],
        };
        assert_eq!(err.to_string(), "Onedrive must set client_secret,name");
    }

    #[test]
    fn api_code_only_for_api_errors() {
        let err = AlistError::Api {
            code: 401,
            message: "password is incorrect".to_string(),
            response: Box::new(HttpResponse::default()),
        };
        assert_eq!(err.api_code(), Some(401));
        assert_eq!(AlistError::not_found("setting", "title").api_code(), None);
    }
}
