#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cometd_mock_api_types::Reply;
use cometd_mock_core::{Batch, ManualClock};
use cometd_mock_engine::{
    Adapter, AdapterChain, Dispatcher, MockConfig, Outcome, Payload, Rejection, RequestContext,
    Validator, ValidatorChain,
};
use serde_json::{Value, json};

/// A dispatcher whose clock only moves when the test says so.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(config: MockConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dispatcher = Dispatcher::with_clock(config, clock.clone())
            .expect("dispatcher should initialize");
        Self { dispatcher, clock }
    }

    /// Uses the given chains instead of resolving `config.validators` / `config.adapters`.
    pub fn with_chains(config: MockConfig, validators: ValidatorChain, adapters: AdapterChain) -> Self {
        let clock = Arc::new(ManualClock::default());
        let dispatcher = Dispatcher::from_parts(config, validators, adapters, clock.clone());
        Self { dispatcher, clock }
    }

    pub fn post(&self, body: Value) -> Outcome {
        let raw = serde_json::to_vec(&body).expect("serialize request");
        self.dispatcher.dispatch(&raw)
    }

    pub fn handshake(&self) -> String {
        let outcome = self.post(json!([{ "id": "1", "channel": "/meta/handshake" }]));
        assert_eq!(outcome.status, 200);
        reply(&outcome)
            .client_id
            .clone()
            .expect("handshake should issue a client id")
    }

    pub fn connect(&self, client_id: &str) -> Outcome {
        self.post(json!([{
            "id": "2",
            "channel": "/meta/connect",
            "clientId": client_id,
            "connectionType": "long-polling"
        }]))
    }

    pub fn disconnect(&self, client_id: &str) -> Outcome {
        self.post(json!([{ "id": "3", "channel": "/meta/disconnect", "clientId": client_id }]))
    }
}

pub fn reply(outcome: &Outcome) -> &Reply {
    outcome.reply().expect("response should be a JSON envelope")
}

pub fn error_of(outcome: &Outcome) -> String {
    reply(outcome).error.clone().unwrap_or_default()
}

/// Counts its invocations and always lets the batch through.
#[derive(Clone, Default)]
pub struct CountingStage {
    calls: Arc<AtomicUsize>,
}

impl CountingStage {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Validator for CountingStage {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn validate(&self, _ctx: &RequestContext<'_>, _payload: &Payload) -> Result<(), Rejection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Adapter for CountingStage {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn adapt(&self, _ctx: &RequestContext<'_>, _batch: &Batch) -> Option<Outcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        None
    }
}

/// Always answers with a fixed 503.
pub struct UnavailableAdapter;

impl Adapter for UnavailableAdapter {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn adapt(&self, _ctx: &RequestContext<'_>, _batch: &Batch) -> Option<Outcome> {
        Some(Outcome::text(503, "Service Unavailable"))
    }
}
