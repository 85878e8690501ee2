//! Client-wide configuration.
//!
//! `ClientConfig` is assembled once and handed to `AlistClient::new`. The TLS
//! part is copied into every `HttpRequest` so the transport can honor it.

use std::path::PathBuf;

use crate::auth::Credential;
use crate::error::{AlistError, Result};

/// PEM files presented to the server for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// TLS behavior applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    /// Verify the server certificate chain and host name.
    pub verify: bool,
    pub client_cert: Option<ClientCertificate>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify: true,
            client_cert: None,
        }
    }
}

/// Everything needed to talk to one server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub tls: TlsOptions,
    /// Used by `AlistClient::connect` to log in right after construction.
    pub credential: Option<Credential>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            tls: TlsOptions::default(),
            credential: None,
        }
    }

    pub fn with_tls_verification(mut self, verify: bool) -> Self {
        self.tls.verify = verify;
        self
    }

    pub fn with_client_cert(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls.client_cert = Some(ClientCertificate {
            cert: cert.into(),
            key: key.into(),
        });
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Read the configuration from `ALIST_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    ///
    /// - `ALIST_URL` (required)
    /// - `ALIST_INSECURE`: `1` or `true` disables certificate verification
    /// - `ALIST_CLIENT_CERT` and `ALIST_CLIENT_KEY`: PEM paths, both or neither
    /// - `ALIST_TOKEN` or `ALIST_PASSWORD`: credential, the token wins
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("ALIST_URL").ok_or_else(|| AlistError::InvalidBaseUrl {
            url: String::new(),
            reason: "ALIST_URL is not set".to_string(),
        })?;
        let mut config = Self::new(&base_url);

        if let Some(insecure) = lookup("ALIST_INSECURE") {
            let insecure = insecure.trim();
            config.tls.verify = !(insecure == "1" || insecure.eq_ignore_ascii_case("true"));
        }
        match (lookup("ALIST_CLIENT_CERT"), lookup("ALIST_CLIENT_KEY")) {
            (Some(cert), Some(key)) => config = config.with_client_cert(cert, key),
            (None, None) => {}
            (cert, _) => {
                let (set, unset) = if cert.is_some() {
                    ("ALIST_CLIENT_CERT", "ALIST_CLIENT_KEY")
                } else {
                    ("ALIST_CLIENT_KEY", "ALIST_CLIENT_CERT")
                };
                return Err(AlistError::InvalidValue {
                    field: unset.to_string(),
                    reason: format!("{set} is set but {unset} is not"),
                });
            }
        }
        config.credential = match (lookup("ALIST_TOKEN"), lookup("ALIST_PASSWORD")) {
            (Some(token), _) => Some(Credential::Token(token)),
            (None, Some(secret)) => Some(Credential::Secret(secret)),
            (None, None) => None,
        };
        Ok(config)
    }
}
