use std::sync::Mutex;

use cometd_mock_api_types::Reply;
use cometd_mock_core::Batch;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::info;

use super::Adapter;
use crate::context::RequestContext;
use crate::outcome::Outcome;

/// Statuses the chaos adapter picks from, uniformly.
pub const CHAOS_RESPONSES: [(u16, &str); 10] = [
    (200, "OK"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (429, "Too Many Requests"),
    (500, "Internal Server Error"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
];

/// Ignores what the client asked for and answers with a random status.
///
/// `200` gets a successful-looking echo, everything else a bare text body.
/// Always answers, so nothing configured after it ever runs. Only meant for
/// deliberately unreliable test runs.
pub struct ChaosAdapter {
    rng: Mutex<StdRng>,
}

impl ChaosAdapter {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible sequence of picks.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self) -> (u16, &'static str) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        CHAOS_RESPONSES
            .choose(&mut *rng)
            .copied()
            .unwrap_or(CHAOS_RESPONSES[0])
    }
}

impl Default for ChaosAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for ChaosAdapter {
    fn name(&self) -> &'static str {
        "chaos"
    }

    fn adapt(&self, _ctx: &RequestContext<'_>, batch: &Batch) -> Option<Outcome> {
        let (status, reason) = self.pick();
        let message = batch.first();
        let client_id = message
            .and_then(|m| m.client_id())
            .unwrap_or("unknown")
            .to_string();

        info!(client_id = %client_id, status, reason, "chaos adapter activated");

        if status == 200 {
            let channel = message.map(|m| m.channel_value()).unwrap_or(Value::Null);
            let reply = Reply::success(channel)
                .with_id(message.and_then(|m| m.id().cloned()))
                .with_client_id(Some(client_id));
            return Some(Outcome::ok(reply));
        }

        Some(Outcome::text(status, reason))
    }
}
