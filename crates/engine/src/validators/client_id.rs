use cometd_mock_core::HANDSHAKE;
use serde_json::Value;

use super::Validator;
use crate::context::{Payload, RequestContext};
use crate::error::{ProtocolError, Rejection};

/// Rejects a non-handshake batch whose `clientId` is not an active session.
///
/// Read-only: expiry and connect accounting happen later in the pipeline.
/// Payloads without a usable first message are left to the other validators.
#[derive(Debug, Default)]
pub struct ClientIdValidator;

impl Validator for ClientIdValidator {
    fn name(&self) -> &'static str {
        "client_id"
    }

    fn validate(&self, ctx: &RequestContext<'_>, payload: &Payload) -> Result<(), Rejection> {
        let Some(first) = payload
            .messages()
            .and_then(|messages| messages[0].as_object())
        else {
            return Ok(());
        };

        let channel = first.get("channel");
        if channel.and_then(Value::as_str) == Some(HANDSHAKE) {
            return Ok(());
        }

        match first.get("clientId").and_then(Value::as_str) {
            Some(client_id) if ctx.sessions.contains(client_id) => Ok(()),
            client_id => Err(Rejection::new(ProtocolError::UnknownClientId(
                client_id.unwrap_or("null").to_string(),
            ))
            .at(channel.cloned(), first.get("id").cloned())),
        }
    }
}
