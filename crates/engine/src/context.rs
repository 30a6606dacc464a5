use chrono::{DateTime, Utc};
use cometd_mock_core::SessionStore;
use serde_json::Value;

use crate::config::MockConfig;

/// A request body after the JSON parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Parsed(Value),
    Malformed(String),
}

impl Payload {
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(value) => Self::Parsed(value),
            Err(err) => Self::Malformed(err.to_string()),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Malformed(_) => None,
        }
    }

    /// The elements of a non-empty JSON array.
    pub fn messages(&self) -> Option<&[Value]> {
        self.value()
            .and_then(Value::as_array)
            .filter(|messages| !messages.is_empty())
            .map(Vec::as_slice)
    }
}

/// Everything validators, adapters and handlers may look at for one request.
#[derive(Clone, Copy)]
pub struct RequestContext<'a> {
    pub config: &'a MockConfig,
    pub sessions: &'a SessionStore,
    /// Taken once per request so every stage agrees on session ages.
    pub now: DateTime<Utc>,
}
