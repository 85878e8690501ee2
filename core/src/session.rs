//! The session client: authenticated GET/POST/DELETE plus login.
//!
//! # Design
//! A `Session` owns its transport, the parsed origin, the TLS options and
//! the login state. Each call builds a request, executes it once and decodes
//! the envelope; transport errors are wrapped but otherwise untouched.
//!
//! Sessions are meant for one thread. They hold no locks, and sharing one
//! across threads (e.g. behind a `Mutex`) gives no ordering guarantees
//! between interleaved logins and requests.

use log::{debug, info, trace};

use crate::auth::{AuthState, Credential};
use crate::config::{ClientConfig, TlsOptions};
use crate::envelope::{decode, Payload};
use crate::error::{AlistError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::request::{build_request, Origin, RequestOptions};
use crate::transport::Transport;

/// Endpoint the server uses to judge a token.
pub const LOGIN_CHECK: &str = "/admin/login";

pub struct Session<T> {
    origin: Origin,
    tls: TlsOptions,
    transport: T,
    state: AuthState,
    token: Option<String>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self> {
        Ok(Self {
            origin: Origin::parse(&config.base_url)?,
            tls: config.tls.clone(),
            transport,
            state: AuthState::Unauthenticated,
            token: None,
        })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// The token currently attached to requests.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Log in and verify the token with the server.
    ///
    /// A no-op returning `Payload::Success` once authenticated. On failure
    /// the unverified token is dropped and the session is unauthenticated
    /// again.
    pub fn login(&mut self, credential: &Credential) -> Result<Payload> {
        if self.is_authenticated() {
            trace!("already authenticated, skipping login");
            return Ok(Payload::Success);
        }
        self.state = AuthState::Authenticating;
        self.token = Some(credential.token());

        match self.get(LOGIN_CHECK, RequestOptions::new()) {
            Ok(payload) => {
                self.state = AuthState::Authenticated;
                info!("logged in to {}", self.origin.base_url());
                Ok(payload)
            }
            Err(err) => {
                self.state = AuthState::Unauthenticated;
                self.token = None;
                info!("login to {} rejected: {err}", self.origin.base_url());
                Err(err)
            }
        }
    }

    /// The request `method endpoint` would send, without sending it.
    pub fn build(&self, method: HttpMethod, endpoint: &str, options: RequestOptions) -> HttpRequest {
        build_request(&self.origin, self.token.as_deref(), &self.tls, method, endpoint, options)
    }

    pub fn get(&mut self, endpoint: &str, options: RequestOptions) -> Result<Payload> {
        self.send(HttpMethod::Get, endpoint, options)
    }

    pub fn post(&mut self, endpoint: &str, options: RequestOptions) -> Result<Payload> {
        self.send(HttpMethod::Post, endpoint, options)
    }

    pub fn delete(&mut self, endpoint: &str, options: RequestOptions) -> Result<Payload> {
        self.send(HttpMethod::Delete, endpoint, options)
    }

    fn send(&mut self, method: HttpMethod, endpoint: &str, options: RequestOptions) -> Result<Payload> {
        let request = self.build(method, endpoint, options);
        debug!("{} {}", method.as_str(), request.url);
        let response = self.transport.execute(&request).map_err(AlistError::Transport)?;
        trace!("{} {} -> {}", method.as_str(), request.url, response.status);
        decode(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::auth::derive_token;
    use crate::error::TransportError;
    use crate::http::HttpResponse;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct Replay {
        responses: VecDeque<HttpResponse>,
        requests: Vec<HttpRequest>,
    }

    impl Replay {
        fn with(bodies: &[&str]) -> Self {
            Self {
                responses: bodies
                    .iter()
                    .map(|b| HttpResponse {
                        status: 200,
                        headers: vec![("content-type".to_string(), "application/json".to_string())],
                        body: b.as_bytes().to_vec(),
                        charset: None,
                    })
                    .collect(),
                requests: Vec::new(),
            }
        }
    }

    impl Transport for Replay {
        fn execute(&mut self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.push(request.clone());
            self.responses.pop_front().ok_or_else(|| "connection refused".into())
        }
    }

    const OK_NULL: &str = r#"{"code":200,"message":"success","data":null}"#;
    const DENIED: &str = r#"{"code":401,"message":"password is incorrect","data":null}"#;

    fn session(replay: Replay) -> Session<Replay> {
        Session::new(&ClientConfig::new("http://localhost:5244"), replay).unwrap()
    }

    #[test]
    fn login_with_secret_sends_derived_token() {
        let mut s = session(Replay::with(&[OK_NULL]));
        let payload = s.login(&Credential::Secret("secret123".to_string())).unwrap();

        assert_eq!(payload, Payload::Success);
        assert_eq!(s.state(), AuthState::Authenticated);
        let sent = &s.transport().requests[0];
        assert_eq!(sent.url, "http://localhost:5244/api/admin/login");
        assert_eq!(sent.method, HttpMethod::Get);
        assert_eq!(sent.header("Authorization"), Some(derive_token("secret123").as_str()));
    }

    #[test]
    fn login_with_token_adopts_it_verbatim() {
        let mut s = session(Replay::with(&[OK_NULL]));
        s.login(&Credential::Token("abc".to_string())).unwrap();
        assert_eq!(s.token(), Some("abc"));
        assert_eq!(s.transport().requests[0].header("Authorization"), Some("abc"));
    }

    #[test]
    fn second_login_is_a_no_op() {
        let mut s = session(Replay::with(&[OK_NULL]));
        let credential = Credential::Secret("secret123".to_string());
        s.login(&credential).unwrap();
        let again = s.login(&credential).unwrap();

        assert_eq!(again, Payload::Success);
        assert_eq!(s.transport().requests.len(), 1);
        assert!(s.is_authenticated());
    }

    #[test]
    fn rejected_login_returns_to_unauthenticated() {
        let mut s = session(Replay::with(&[DENIED, OK_NULL]));
        let err = s.login(&Credential::Secret("wrong".to_string())).unwrap_err();

        assert_eq!(err.api_code(), Some(401));
        assert_eq!(s.state(), AuthState::Unauthenticated);
        assert_eq!(s.token(), None);
        assert_eq!(
            s.transport().requests[0].header("Authorization"),
            Some(derive_token("wrong").as_str())
        );

        s.login(&Credential::Secret("secret123".to_string())).unwrap();
        assert!(s.is_authenticated());
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let mut s = session(Replay::default());
        let err = s.get("/public/settings", RequestOptions::new()).unwrap_err();
        match err {
            AlistError::Transport(inner) => assert_eq!(inner.to_string(), "connection refused"),
            other => panic!("expected Transport, got {other:?}"),
        }
        assert_eq!(s.transport().requests.len(), 1);
    }

    #[test]
    fn requests_before_login_carry_no_authorization() {
        let mut s = session(Replay::with(&[OK_NULL]));
        s.get("/public/settings", RequestOptions::new()).unwrap();
        assert_eq!(s.transport().requests[0].header("Authorization"), None);
    }
}
