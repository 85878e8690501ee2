//! Credentials and the authorization token.
//!
//! The server accepts a token derived from the admin password with a keyed
//! MD5 over a fixed prefix. The prefix is part of the server's protocol and
//! must be reproduced byte for byte.

use md5::{Digest, Md5};

const TOKEN_PREFIX: &str = "https://github.com/Xhofe/alist-";

/// What the caller logs in with.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// The admin password; the token is derived from it.
    Secret(String),
    /// A token obtained earlier, used verbatim.
    Token(String),
}

impl Credential {
    /// The token this credential puts in the `Authorization` header.
    pub fn token(&self) -> String {
        match self {
            Credential::Secret(secret) => derive_token(secret),
            Credential::Token(token) => token.clone(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Secret(_) => f.write_str("Secret(***)"),
            Credential::Token(_) => f.write_str("Token(***)"),
        }
    }
}

/// `hex(md5(TOKEN_PREFIX + secret))`, lower-case.
pub fn derive_token(secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(TOKEN_PREFIX.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Login progress of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// A token is attached and waiting for the server to confirm it.
    Authenticating,
    /// Terminal: the token was accepted and never changes again.
    Authenticated,
}
