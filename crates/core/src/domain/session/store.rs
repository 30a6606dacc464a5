use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::{ClientSession, ExpiryPolicy, ReconnectPolicy};
use crate::domain::{ClientId, SessionError};

/// Result of accounting one connect against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectTally {
    Connected { connection_count: u64 },
    /// A reconnect limit was exceeded; the count is back to 1.
    ReconnectAdvised,
}

/// Sessions of all handshaken clients, keyed by client id.
///
/// Every read-compare-write on a session happens under that key's shard lock,
/// so concurrent connects for the same client cannot both slip under a limit.
/// Sessions are independent; nothing locks across keys.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<ClientId, ClientSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh client id and starts its session at `now`.
    #[tracing::instrument(skip(self))]
    pub fn open(&self, now: DateTime<Utc>) -> Result<ClientSession, SessionError> {
        let session = ClientSession::new(ClientId::new(), now);

        match self.sessions.entry(session.client_id) {
            Entry::Occupied(_) => Err(SessionError::DuplicateClientId(session.client_id)),
            Entry::Vacant(slot) => {
                slot.insert(session.clone());
                debug!(client_id = %session.client_id, "session opened");
                Ok(session)
            }
        }
    }

    pub fn get(&self, client_id: &str) -> Option<ClientSession> {
        let key = client_id.parse::<ClientId>().ok()?;
        self.sessions.get(&key).map(|session| session.clone())
    }

    pub fn contains(&self, client_id: &str) -> bool {
        client_id
            .parse::<ClientId>()
            .is_ok_and(|key| self.sessions.contains_key(&key))
    }

    /// Fails with [`SessionError::UnknownClientId`] unless the session is active.
    pub fn require(&self, client_id: &str) -> Result<ClientSession, SessionError> {
        self.get(client_id)
            .ok_or_else(|| SessionError::UnknownClientId(client_id.to_string()))
    }

    /// Counts one connect, then resets to 1 if `policy` is now exceeded.
    #[tracing::instrument(skip(self, policy))]
    pub fn register_connect(
        &self,
        client_id: &str,
        policy: &ReconnectPolicy,
        now: DateTime<Utc>,
    ) -> Result<ConnectTally, SessionError> {
        let unknown = || SessionError::UnknownClientId(client_id.to_string());
        let key = client_id.parse::<ClientId>().map_err(|_| unknown())?;
        let mut session = self.sessions.get_mut(&key).ok_or_else(unknown)?;

        session.connection_count = session.connection_count.saturating_add(1);
        if policy.is_exceeded(session.connection_count, session.age(now)) {
            session.connection_count = 1;
            debug!(client_id, "reconnect limit exceeded, count reset");
            return Ok(ConnectTally::ReconnectAdvised);
        }

        debug!(client_id, connection_count = session.connection_count, "connect counted");
        Ok(ConnectTally::Connected {
            connection_count: session.connection_count,
        })
    }

    /// Resets the count to 1 and returns true if `policy` is already exceeded,
    /// without counting a connect. Unknown ids are left alone.
    pub fn force_reconnect_if_due(
        &self,
        client_id: &str,
        policy: &ReconnectPolicy,
        now: DateTime<Utc>,
    ) -> bool {
        let Ok(key) = client_id.parse::<ClientId>() else {
            return false;
        };
        let Some(mut session) = self.sessions.get_mut(&key) else {
            return false;
        };

        if policy.is_exceeded(session.connection_count, session.age(now)) {
            session.connection_count = 1;
            true
        } else {
            false
        }
    }

    /// Removes the session if `policy` says it is due. Returns whether it was removed.
    pub fn expire_if_due(&self, client_id: &str, policy: &ExpiryPolicy, now: DateTime<Utc>) -> bool {
        let Ok(key) = client_id.parse::<ClientId>() else {
            return false;
        };

        let expired = self
            .sessions
            .remove_if(&key, |_, session| policy.is_due(session, now))
            .is_some();
        if expired {
            debug!(client_id, "session expired");
        }
        expired
    }

    /// Removes the session for good.
    #[tracing::instrument(skip(self))]
    pub fn close(&self, client_id: &str) -> Result<ClientSession, SessionError> {
        let unknown = || SessionError::UnknownClientId(client_id.to_string());
        let key = client_id.parse::<ClientId>().map_err(|_| unknown())?;

        self.sessions
            .remove(&key)
            .map(|(_, session)| session)
            .ok_or_else(unknown)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};

    use chrono::TimeDelta;

    use super::*;

    fn every(n: u64) -> ReconnectPolicy {
        ReconnectPolicy {
            max_connections: Some(n),
            max_age_secs: None,
        }
    }

    #[test]
    fn test_open_issues_distinct_ids() {
        let store = SessionStore::new();
        let now = Utc::now();

        let ids: HashSet<ClientId> = (0..100)
            .map(|_| store.open(now).expect("session should open").client_id)
            .collect();

        assert_eq!(ids.len(), 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_open_starts_at_zero_connections() {
        let store = SessionStore::new();
        let now = Utc::now();

        let session = store.open(now).expect("session should open");

        assert_eq!(session.connection_count, 0);
        assert_eq!(session.created_at, now);
        assert_eq!(store.get(&session.client_id.to_string()), Some(session));
    }

    #[test]
    fn test_register_connect_resets_past_limit() {
        let store = SessionStore::new();
        let now = Utc::now();
        let id = store.open(now).expect("session should open").client_id.to_string();
        let policy = every(2);

        let tallies: Vec<ConnectTally> = (0..4)
            .map(|_| store.register_connect(&id, &policy, now).expect("known client"))
            .collect();

        assert_eq!(
            tallies,
            vec![
                ConnectTally::Connected { connection_count: 1 },
                ConnectTally::Connected { connection_count: 2 },
                ConnectTally::ReconnectAdvised,
                ConnectTally::Connected { connection_count: 2 },
            ]
        );
    }

    #[test]
    fn test_register_connect_unknown_client() {
        let store = SessionStore::new();

        let err = store
            .register_connect("ghost", &every(5), Utc::now())
            .expect_err("ghost should be unknown");

        assert_eq!(err, SessionError::UnknownClientId("ghost".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_force_reconnect_only_when_exceeded() {
        let store = SessionStore::new();
        let start = Utc::now();
        let id = store.open(start).expect("session should open").client_id.to_string();
        let by_age = ReconnectPolicy {
            max_connections: None,
            max_age_secs: Some(60),
        };

        assert!(!store.force_reconnect_if_due(&id, &by_age, start + TimeDelta::seconds(60)));
        assert!(store.force_reconnect_if_due(&id, &by_age, start + TimeDelta::seconds(61)));
        assert_eq!(store.get(&id).map(|s| s.connection_count), Some(1));
        assert!(!store.force_reconnect_if_due("ghost", &by_age, start));
    }

    #[test]
    fn test_expire_removes_due_session() {
        let store = SessionStore::new();
        let now = Utc::now();
        let id = store.open(now).expect("session should open").client_id.to_string();
        let policy = ExpiryPolicy {
            after_count: Some(2),
            after_secs: None,
        };

        store.register_connect(&id, &ReconnectPolicy::default(), now).expect("known");
        assert!(!store.expire_if_due(&id, &policy, now));

        store.register_connect(&id, &ReconnectPolicy::default(), now).expect("known");
        assert!(store.expire_if_due(&id, &policy, now));
        assert!(!store.contains(&id));
        assert!(store.require(&id).is_err());
    }

    #[test]
    fn test_close_is_not_repeatable() {
        let store = SessionStore::new();
        let id = store.open(Utc::now()).expect("session should open").client_id.to_string();

        store.close(&id).expect("first close succeeds");
        let err = store.close(&id).expect_err("second close fails");

        assert_eq!(err, SessionError::UnknownClientId(id));
    }

    #[test]
    fn test_concurrent_connects_never_overshoot() {
        let store = SessionStore::new();
        let now = Utc::now();
        let id = store.open(now).expect("session should open").client_id.to_string();
        let policy = every(10);
        let advised = AtomicU64::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        match store.register_connect(&id, &policy, now).expect("known client") {
                            ConnectTally::Connected { connection_count } => {
                                assert!(connection_count <= 10)
                            }
                            ConnectTally::ReconnectAdvised => {
                                advised.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    }
                });
            }
        });

        // 800 connects: the 11th, 21st, ... 791st are advised.
        assert_eq!(advised.load(Ordering::SeqCst), 79);
        assert_eq!(store.get(&id).map(|s| s.connection_count), Some(10));
    }
}
