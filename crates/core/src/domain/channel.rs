use std::fmt;

pub const HANDSHAKE: &str = "/meta/handshake";
pub const CONNECT: &str = "/meta/connect";
pub const SUBSCRIBE: &str = "/meta/subscribe";
pub const UNSUBSCRIBE: &str = "/meta/unsubscribe";
pub const DISCONNECT: &str = "/meta/disconnect";

/// Routing key of a message. Only the meta channels have handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Handshake,
    Connect,
    Subscribe,
    Unsubscribe,
    Disconnect,
    Other(String),
}

impl Channel {
    pub fn parse(name: &str) -> Self {
        match name {
            HANDSHAKE => Self::Handshake,
            CONNECT => Self::Connect,
            SUBSCRIBE => Self::Subscribe,
            UNSUBSCRIBE => Self::Unsubscribe,
            DISCONNECT => Self::Disconnect,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Handshake => HANDSHAKE,
            Self::Connect => CONNECT,
            Self::Subscribe => SUBSCRIBE,
            Self::Unsubscribe => UNSUBSCRIBE,
            Self::Disconnect => DISCONNECT,
            Self::Other(name) => name,
        }
    }

    /// Fields a message on this channel must carry before its handler may run.
    /// Sorted, so the names can be reported as-is.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Handshake => &["channel", "id"],
            Self::Connect => &["clientId", "id"],
            Self::Subscribe | Self::Unsubscribe => &["clientId", "subscription"],
            Self::Disconnect => &["clientId"],
            Self::Other(_) => &[],
        }
    }

    pub fn is_handshake(&self) -> bool {
        matches!(self, Self::Handshake)
    }
}

impl From<&str> for Channel {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
