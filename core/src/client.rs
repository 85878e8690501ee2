//! Entry point: `AlistClient` and its endpoint groups.
//!
//! # Design
//! The client owns the session (transport, origin, login state) and the
//! in-memory lists that admin operations refresh: accounts, metas and the
//! driver registry. `public()` and `admin()` hand out short-lived views that
//! borrow the client mutably, so each call can update those lists in place.
//!
//! Like `Session`, a client is meant for one thread at a time.

use log::debug;

use crate::account::AccountSchema;
use crate::admin::{Admin, ACCOUNTS_ENDPOINT, METAS_ENDPOINT};
use crate::auth::Credential;
use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::driver::DriverRegistry;
use crate::envelope::Payload;
use crate::error::Result;
use crate::meta::MetaSchema;
use crate::public::Public;
use crate::session::Session;
use crate::transport::{Transport, UreqTransport};

pub struct AlistClient<T = UreqTransport> {
    pub(crate) session: Session<T>,
    pub(crate) drivers: DriverRegistry,
    pub(crate) accounts: Collection<AccountSchema>,
    pub(crate) metas: Collection<MetaSchema>,
}

impl AlistClient<UreqTransport> {
    /// Build a client over `ureq` and log in when the configuration carries
    /// a credential.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let mut client = Self::new(&config, UreqTransport::new())?;
        if let Some(credential) = &config.credential {
            client.login(credential)?;
        }
        Ok(client)
    }
}

impl<T: Transport> AlistClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self> {
        debug!("creating client for {}", config.base_url);
        Ok(Self {
            session: Session::new(config, transport)?,
            drivers: DriverRegistry::default(),
            accounts: Collection::new(ACCOUNTS_ENDPOINT),
            metas: Collection::new(METAS_ENDPOINT),
        })
    }

    /// See `Session::login`.
    pub fn login(&mut self, credential: &Credential) -> Result<Payload> {
        self.session.login(credential)
    }

    pub fn is_login(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Driver registry as of the last fetch.
    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    /// Endpoints that work without logging in.
    pub fn public(&mut self) -> Public<'_, T> {
        Public::new(&mut self.session)
    }

    /// Endpoints under `/admin`; they need a successful `login`.
    pub fn admin(&mut self) -> Admin<'_, T> {
        Admin::new(self)
    }
}
