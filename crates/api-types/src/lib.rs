//! Wire types of the Bayeux response envelope shared by every layer of the mock.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel used for replies to batches too broken to name a channel of their own.
pub const ERROR_CHANNEL: &str = "/meta/error";

/// Connection type advertised at handshake. Never actually held open.
pub const LONG_POLLING: &str = "long-polling";

/// Protocol version advertised at handshake.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Reconnect advice. The server only ever issues the three known values;
/// whatever else a client sends is kept as-is so it can be echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reconnect {
    Retry,
    Handshake,
    None,
    #[serde(untagged)]
    Other(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    /// How the client should reconnect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect: Option<Reconnect>,
    /// Delay (ms) before the next connect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    /// How long (ms) a connect may be held open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Advice {
    #[must_use]
    pub fn reconnect(reconnect: Reconnect) -> Self {
        Self {
            reconnect: Some(reconnect),
            ..Self::default()
        }
    }
}

/// A subscribe/unsubscribe target: one channel pattern or several.
///
/// `Other` holds any other JSON value verbatim; it only gets past the
/// validators when validation is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subscription {
    One(String),
    Many(Vec<String>),
    Other(Value),
}

impl Default for Subscription {
    fn default() -> Self {
        Self::One("mock-subscription".to_string())
    }
}

/// One result object of the response envelope. The envelope itself is always
/// a JSON array, see [`envelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// The request message's `id`, echoed untouched (any JSON type).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Channel being answered; `/meta/error` when the request named none.
    pub channel: Value,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Protocol version. Handshake only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Handshake only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_connection_types: Option<Vec<String>>,
    /// Subscribe/unsubscribe only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
    /// `"<code>::<detail>"`, set on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Advice>,
}

impl Reply {
    #[must_use]
    pub fn success(channel: impl Into<Value>) -> Self {
        Self {
            id: None,
            channel: channel.into(),
            successful: true,
            client_id: None,
            version: None,
            supported_connection_types: None,
            subscription: None,
            error: None,
            advice: None,
        }
    }

    #[must_use]
    pub fn failure(channel: impl Into<Value>, error: impl Into<String>, reconnect: Reconnect) -> Self {
        Self {
            successful: false,
            error: Some(error.into()),
            advice: Some(Advice::reconnect(reconnect)),
            ..Self::success(channel)
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Option<Value>) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: Option<String>) -> Self {
        self.client_id = client_id;
        self
    }

    #[must_use]
    pub fn with_advice(mut self, advice: Advice) -> Self {
        self.advice = Some(advice);
        self
    }
}

/// Wraps a single reply into the array envelope the protocol requires.
#[must_use]
pub fn envelope(reply: Reply) -> Vec<Reply> {
    vec![reply]
}
