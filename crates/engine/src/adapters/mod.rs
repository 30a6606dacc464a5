//! Behavioural interceptors consulted after validation, for every channel but
//! handshake. They can replace the normal reply to simulate reconnect storms,
//! expiring sessions or an unreliable server.

use cometd_mock_core::Batch;
use tracing::info;

use crate::context::RequestContext;
use crate::outcome::Outcome;

mod chaos;
mod expire;
mod reconnect;

pub use chaos::{CHAOS_RESPONSES, ChaosAdapter};
pub use expire::ExpireAdapter;
pub use reconnect::ReconnectAdapter;

pub trait Adapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Some` replaces the response; later adapters and the handler are skipped.
    fn adapt(&self, ctx: &RequestContext<'_>, batch: &Batch) -> Option<Outcome>;
}

/// Adapters in their configured order. The first substitute response wins.
#[derive(Default)]
pub struct AdapterChain {
    adapters: Vec<Box<dyn Adapter>>,
}

impl AdapterChain {
    pub fn new(adapters: Vec<Box<dyn Adapter>>) -> Self {
        Self { adapters }
    }

    pub fn run(&self, ctx: &RequestContext<'_>, batch: &Batch) -> Option<Outcome> {
        self.adapters.iter().find_map(|adapter| {
            let outcome = adapter.adapt(ctx, batch)?;
            info!(adapter = adapter.name(), status = outcome.status, "response replaced by adapter");
            Some(outcome)
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
