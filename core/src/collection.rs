//! Server-side record lists held in memory.
//!
//! A `Collection` is rebuilt from scratch on every `fetch`; there is no
//! diffing and nothing survives between fetches. Slices handed out by
//! `fetch` and `records` are snapshots of the last fetch.

use std::fmt;

use log::debug;
use serde_json::Value;

use crate::error::{AlistError, Result};
use crate::record::{Record, Schema};
use crate::request::RequestOptions;
use crate::session::Session;
use crate::transport::Transport;

/// Identity or human-readable key of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i64),
    Key(String),
}

impl Lookup {
    /// True when `record`'s identity or secondary key equals this lookup.
    pub fn matches<S: Schema>(&self, record: &Record<S>) -> bool {
        match self {
            Lookup::Id(id) => record.id().and_then(Value::as_i64) == Some(*id),
            Lookup::Key(key) => {
                record.id().and_then(Value::as_str) == Some(key.as_str())
                    || record.secondary_key() == Some(key.as_str())
            }
        }
    }
}

impl From<i64> for Lookup {
    fn from(id: i64) -> Self {
        Lookup::Id(id)
    }
}

impl From<&str> for Lookup {
    fn from(key: &str) -> Self {
        Lookup::Key(key.to_string())
    }
}

impl From<String> for Lookup {
    fn from(key: String) -> Self {
        Lookup::Key(key)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "{id}"),
            Lookup::Key(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Collection<S> {
    endpoint: &'static str,
    records: Vec<Record<S>>,
}

impl<S: Schema> Collection<S> {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            records: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    /// Drop the current list and rebuild it from the server.
    ///
    /// A reply without data (`Payload::Success`) is an empty list.
    pub fn fetch<T: Transport>(&mut self, session: &mut Session<T>) -> Result<&[Record<S>]> {
        self.records.clear();
        let records: Option<Vec<Record<S>>> = session
            .get(self.endpoint, RequestOptions::new())?
            .into_data(S::NAME)?;
        self.records = records.unwrap_or_default();
        debug!("fetched {} {} records", self.records.len(), S::NAME);
        Ok(&self.records)
    }

    /// Replace the in-memory list.
    pub fn load(&mut self, records: Vec<Record<S>>) {
        self.records = records;
    }

    /// First record matching `lookup` in the last fetched list.
    pub fn find(&self, lookup: impl Into<Lookup>) -> Result<&Record<S>> {
        let lookup = lookup.into();
        self.records
            .iter()
            .find(|r| lookup.matches(r))
            .ok_or_else(|| AlistError::not_found(S::NAME, &lookup))
    }

    pub fn records(&self) -> &[Record<S>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
