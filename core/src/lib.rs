//! Typed client for the alist file-storage server HTTP API.
//!
//! # Overview
//! Every call goes through the same pipeline: `request::build_request`
//! produces an `HttpRequest`, a `Transport` executes it, and
//! `envelope::decode` turns the `HttpResponse` into a `Payload` or an
//! `AlistError`. Request building and decoding never touch the network, so
//! the pipeline is testable with a transport that replays canned responses.
//!
//! # Design
//! - `Session` owns the origin, the transport and the login state. The
//!   token is fixed once a login succeeds.
//! - `Record<S>` is a JSON object checked against a static `Schema`:
//!   unknown fields, immutable fields and field deletion are rejected.
//! - `AlistClient` holds the session plus the account, meta and driver lists
//!   that `admin()` operations refresh.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod account;
pub mod admin;
pub mod auth;
pub mod client;
pub mod collection;
pub mod config;
pub mod driver;
pub mod envelope;
pub mod error;
pub mod http;
pub mod meta;
pub mod public;
pub mod record;
pub mod request;
pub mod session;
pub mod setting;
pub mod transport;

pub use account::Account;
pub use admin::{Admin, OnedriveAccount, SettingAccessor};
pub use auth::{derive_token, AuthState, Credential};
pub use client::AlistClient;
pub use collection::{Collection, Lookup};
pub use config::{ClientCertificate, ClientConfig, TlsOptions};
pub use driver::{Driver, DriverAttribute, DriverRegistry};
pub use envelope::{decode, Payload};
pub use error::{AlistError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use meta::{Meta, MetaDraft};
pub use public::{Page, Public};
pub use record::{Record, Schema};
pub use request::RequestOptions;
pub use session::Session;
pub use setting::{Setting, SettingGroup, SettingValue};
pub use transport::{Transport, UreqTransport};
