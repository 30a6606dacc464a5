use cometd_mock_core::Batch;

use super::Adapter;
use crate::context::RequestContext;
use crate::outcome::Outcome;

/// Drops the session once it reaches `expire_after_count` connects or
/// `expire_after_seconds` of age. Never answers itself: whatever runs next
/// sees an unknown client id.
///
/// Expiry is only noticed when the client comes back; nothing sweeps.
#[derive(Debug, Default)]
pub struct ExpireAdapter;

impl Adapter for ExpireAdapter {
    fn name(&self) -> &'static str {
        "expire"
    }

    fn adapt(&self, ctx: &RequestContext<'_>, batch: &Batch) -> Option<Outcome> {
        let client_id = batch.first()?.client_id()?;
        if ctx
            .sessions
            .expire_if_due(client_id, &ctx.config.expiry_policy(), ctx.now)
        {
            tracing::info!(client_id, "expired client id");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use cometd_mock_core::{ReconnectPolicy, SessionStore};
    use serde_json::json;

    use super::*;
    use crate::config::MockConfig;

    fn batch_for(client_id: &str) -> Batch {
        Batch::from_value(&json!([{ "channel": "/meta/connect", "clientId": client_id }]))
    }

    #[test]
    fn expires_by_age_and_falls_through() {
        let config = MockConfig {
            expire_after_seconds: Some(10),
            ..MockConfig::default()
        };
        let sessions = SessionStore::new();
        let start = Utc::now();
        let client_id = sessions.open(start).expect("session").client_id.to_string();

        let early = RequestContext {
            config: &config,
            sessions: &sessions,
            now: start + TimeDelta::seconds(9),
        };
        assert_eq!(ExpireAdapter.adapt(&early, &batch_for(&client_id)), None);
        assert!(sessions.contains(&client_id));

        let late = RequestContext {
            now: start + TimeDelta::seconds(10),
            ..early
        };
        assert_eq!(ExpireAdapter.adapt(&late, &batch_for(&client_id)), None);
        assert!(!sessions.contains(&client_id));
    }

    #[test]
    fn expires_by_count() {
        let config = MockConfig {
            expire_after_count: Some(1),
            ..MockConfig::default()
        };
        let sessions = SessionStore::new();
        let now = Utc::now();
        let client_id = sessions.open(now).expect("session").client_id.to_string();
        let ctx = RequestContext {
            config: &config,
            sessions: &sessions,
            now,
        };

        ExpireAdapter.adapt(&ctx, &batch_for(&client_id));
        assert!(sessions.contains(&client_id));

        sessions
            .register_connect(&client_id, &ReconnectPolicy::default(), now)
            .expect("known");
        ExpireAdapter.adapt(&ctx, &batch_for(&client_id));
        assert!(!sessions.contains(&client_id));
    }
}
