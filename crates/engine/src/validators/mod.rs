//! Checks a batch must pass before any protocol logic sees it.

use tracing::warn;

use crate::context::{Payload, RequestContext};
use crate::error::Rejection;

mod client_id;
mod request;
mod required_fields;

pub use client_id::ClientIdValidator;
pub use request::RequestValidator;
pub use required_fields::RequiredFieldsValidator;

pub(crate) use required_fields::missing_required_fields;

/// One structural or semantic check over a raw batch.
pub trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must not touch session state.
    fn validate(&self, ctx: &RequestContext<'_>, payload: &Payload) -> Result<(), Rejection>;
}

/// Validators in their configured order. The first rejection wins.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new(validators: Vec<Box<dyn Validator>>) -> Self {
        Self { validators }
    }

    pub fn run(&self, ctx: &RequestContext<'_>, payload: &Payload) -> Result<(), Rejection> {
        for validator in &self.validators {
            if let Err(rejection) = validator.validate(ctx, payload) {
                warn!(
                    validator = validator.name(),
                    error = %rejection.error,
                    channel = ?rejection.channel,
                    "batch rejected"
                );
                return Err(rejection);
            }
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
