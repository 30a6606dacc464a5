use std::sync::Arc;

use cometd_mock_core::{Batch, Clock, SessionStore, SystemClock};
use tracing::{debug, error, info};

use crate::adapters::AdapterChain;
use crate::config::MockConfig;
use crate::context::{Payload, RequestContext};
use crate::error::{ProtocolError, Rejection, Result};
use crate::handlers;
use crate::outcome::Outcome;
use crate::registry;
use crate::validators::ValidatorChain;

/// Runs one request through the pipeline:
/// parse, validators, adapters (except on handshake), channel handler.
///
/// The session store is the only state shared between requests.
pub struct Dispatcher {
    config: Arc<MockConfig>,
    sessions: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    validators: ValidatorChain,
    adapters: AdapterChain,
}

impl Dispatcher {
    pub fn new(config: MockConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Resolves the configured validator and adapter names.
    pub fn with_clock(config: MockConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let validators = registry::resolve_validators(config.validators.as_slice())?;
        let adapters = registry::resolve_adapters(config.adapters.as_slice())?;

        info!(
            validators = ?validators.names(),
            adapters = ?adapters.names(),
            no_validation = config.no_validation,
            "initializing dispatcher"
        );

        Ok(Self::from_parts(config, validators, adapters, clock))
    }

    /// Takes already-built chains as they are; `config.validators` and
    /// `config.adapters` are ignored.
    pub fn from_parts(
        config: MockConfig,
        validators: ValidatorChain,
        adapters: AdapterChain,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            clock,
            validators,
            adapters,
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[tracing::instrument(skip_all, fields(bytes = body.len()))]
    pub fn dispatch(&self, body: &[u8]) -> Outcome {
        let payload = Payload::parse(body);
        let ctx = RequestContext {
            config: &self.config,
            sessions: &self.sessions,
            now: self.clock.now(),
        };
        let validation_status = self.config.validation_error_status;

        if !self.config.no_validation
            && let Err(rejection) = self.validators.run(&ctx, &payload)
        {
            return rejection.into_outcome(validation_status);
        }

        let batch = payload.value().map(Batch::from_value).unwrap_or_default();
        let Some(message) = batch.first() else {
            return Rejection::new(ProtocolError::UnknownChannel(String::new()))
                .into_outcome(validation_status);
        };
        debug!(channel = %message.channel_value(), messages = batch.len(), "processing request");

        if !message.is_handshake()
            && let Some(outcome) = self.adapters.run(&ctx, &batch)
        {
            return outcome;
        }

        match handlers::route(&ctx, message) {
            Ok(reply) => Outcome::ok(reply),
            Err(err) => {
                match &err {
                    ProtocolError::Internal(detail) => {
                        error!(error = %detail, "error processing request")
                    }
                    ProtocolError::UnknownChannel(channel) => {
                        error!(channel = %channel, "unknown channel")
                    }
                    other => debug!(error = %other, "request refused"),
                }
                Rejection::new(err)
                    .at(Some(message.channel_value()), message.id().cloned())
                    .into_outcome(validation_status)
            }
        }
    }
}
