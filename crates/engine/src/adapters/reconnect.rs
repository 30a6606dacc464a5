use cometd_mock_core::Batch;
use tracing::info;

use super::Adapter;
use crate::context::RequestContext;
use crate::handlers::reconnect_advice;
use crate::outcome::Outcome;

/// Tells the client to reconnect once its session has more connects than
/// `reconnection_interval` or is older than `reconnection_interval_seconds`,
/// resetting the count to 1.
///
/// Compares the count as it stands, before this request is counted. The
/// connect handler keeps the count at or below the interval, so the two never
/// both fire for one request.
#[derive(Debug, Default)]
pub struct ReconnectAdapter;

impl Adapter for ReconnectAdapter {
    fn name(&self) -> &'static str {
        "reconnect"
    }

    fn adapt(&self, ctx: &RequestContext<'_>, batch: &Batch) -> Option<Outcome> {
        let message = batch.first()?;
        let client_id = message.client_id()?;

        if !ctx
            .sessions
            .force_reconnect_if_due(client_id, &ctx.config.reconnect_policy(), ctx.now)
        {
            return None;
        }

        info!(client_id, "reconnection interval exceeded, advising reconnect");
        Some(Outcome::ok(reconnect_advice(
            message.channel_value(),
            message.id().cloned(),
            Some(client_id.to_string()),
        )))
    }
}
