//! Client sessions and the policies that age them.

use chrono::{DateTime, TimeDelta, Utc};

use super::ClientId;

/// Session store implementation.
pub mod store;
pub use store::{ConnectTally, SessionStore};

/// State kept for one handshaken client.
///
/// Owned by [`SessionStore`]; everything outside the store only sees copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub client_id: ClientId,
    /// Starts at 0 on handshake and counts successful connects since the last reset.
    pub connection_count: u64,
    pub created_at: DateTime<Utc>,
}

impl ClientSession {
    pub fn new(client_id: ClientId, created_at: DateTime<Utc>) -> Self {
        Self {
            client_id,
            connection_count: 0,
            created_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.created_at)
    }
}

/// When a client should be told to reconnect. A `None` limit is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_connections: Option<u64>,
    pub max_age_secs: Option<u64>,
}

impl ReconnectPolicy {
    /// True once either limit is strictly exceeded.
    pub fn is_exceeded(&self, connection_count: u64, age: TimeDelta) -> bool {
        self.max_connections
            .is_some_and(|limit| connection_count > limit)
            || self.max_age_secs.is_some_and(|limit| age > seconds(limit))
    }
}

/// When a session is silently dropped. A `None` limit is disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub after_count: Option<u64>,
    pub after_secs: Option<u64>,
}

impl ExpiryPolicy {
    /// True once either limit is reached.
    pub fn is_due(&self, session: &ClientSession, now: DateTime<Utc>) -> bool {
        self.after_count
            .is_some_and(|limit| session.connection_count >= limit)
            || self
                .after_secs
                .is_some_and(|limit| session.age(now) >= seconds(limit))
    }
}

fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
