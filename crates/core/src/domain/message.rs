use cometd_mock_api_types::{Reconnect, Subscription};
use serde_json::{Map, Value};

use super::Channel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connect {
    pub id: Option<Value>,
    pub client_id: Option<String>,
    pub connection_type: Option<String>,
    /// `advice.reconnect` as sent by the client, echoed back on success even
    /// when it is not one of the known values.
    pub reconnect: Option<Reconnect>,
}

/// Body of both subscribe and unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionChange {
    pub id: Option<Value>,
    pub client_id: Option<String>,
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub id: Option<Value>,
    pub client_id: Option<String>,
}

/// Anything that is not a meta channel with a handler, including elements that
/// were not objects or had no usable channel (reachable only with validation off).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherMessage {
    pub id: Option<Value>,
    pub channel: Option<Value>,
    pub client_id: Option<String>,
}

/// One inbound message, typed by its channel.
///
/// Fields are optional because typing is lenient: with validation bypassed the
/// handlers still run on whatever the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Handshake(Handshake),
    Connect(Connect),
    Subscribe(SubscriptionChange),
    Unsubscribe(SubscriptionChange),
    Disconnect(Disconnect),
    Other(OtherMessage),
}

impl Message {
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::Other(OtherMessage {
                id: None,
                channel: None,
                client_id: None,
            });
        };

        let id = fields.get("id").cloned();
        let client_id = string_field(fields, "clientId");

        let Some(name) = fields.get("channel").and_then(Value::as_str) else {
            return Self::Other(OtherMessage {
                id,
                channel: fields.get("channel").cloned(),
                client_id,
            });
        };

        match Channel::parse(name) {
            Channel::Handshake => Self::Handshake(Handshake { id }),
            Channel::Connect => Self::Connect(Connect {
                id,
                client_id,
                connection_type: string_field(fields, "connectionType"),
                reconnect: fields
                    .get("advice")
                    .and_then(|advice| advice.get("reconnect"))
                    .and_then(|value| serde_json::from_value(value.clone()).ok()),
            }),
            Channel::Subscribe => Self::Subscribe(SubscriptionChange {
                id,
                client_id,
                subscription: subscription_field(fields),
            }),
            Channel::Unsubscribe => Self::Unsubscribe(SubscriptionChange {
                id,
                client_id,
                subscription: subscription_field(fields),
            }),
            Channel::Disconnect => Self::Disconnect(Disconnect { id, client_id }),
            Channel::Other(name) => Self::Other(OtherMessage {
                id,
                channel: Some(Value::String(name)),
                client_id,
            }),
        }
    }

    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Handshake(_) => Some(Channel::Handshake),
            Self::Connect(_) => Some(Channel::Connect),
            Self::Subscribe(_) => Some(Channel::Subscribe),
            Self::Unsubscribe(_) => Some(Channel::Unsubscribe),
            Self::Disconnect(_) => Some(Channel::Disconnect),
            Self::Other(other) => other
                .channel
                .as_ref()
                .and_then(Value::as_str)
                .map(Channel::parse),
        }
    }

    /// The channel as it appeared on the wire, for echoing into replies.
    pub fn channel_value(&self) -> Value {
        match self {
            Self::Other(other) => other.channel.clone().unwrap_or(Value::Null),
            typed => typed
                .channel()
                .map(|channel| Value::String(channel.as_str().to_string()))
                .unwrap_or(Value::Null),
        }
    }

    pub fn id(&self) -> Option<&Value> {
        match self {
            Self::Handshake(m) => m.id.as_ref(),
            Self::Connect(m) => m.id.as_ref(),
            Self::Subscribe(m) | Self::Unsubscribe(m) => m.id.as_ref(),
            Self::Disconnect(m) => m.id.as_ref(),
            Self::Other(m) => m.id.as_ref(),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Handshake(_) => None,
            Self::Connect(m) => m.client_id.as_deref(),
            Self::Subscribe(m) | Self::Unsubscribe(m) => m.client_id.as_deref(),
            Self::Disconnect(m) => m.client_id.as_deref(),
            Self::Other(m) => m.client_id.as_deref(),
        }
    }

    pub fn is_handshake(&self) -> bool {
        matches!(self, Self::Handshake(_))
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn subscription_field(fields: &Map<String, Value>) -> Option<Subscription> {
    fields
        .get("subscription")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

/// The messages of one request, in wire order. Only the first one is routed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    messages: Vec<Message>,
}

impl Batch {
    /// Types every element of a JSON array. Anything else yields an empty batch.
    pub fn from_value(value: &Value) -> Self {
        let messages = value
            .as_array()
            .map(|items| items.iter().map(Message::from_value).collect())
            .unwrap_or_default();
        Self { messages }
    }

    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<Message>> for Batch {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
