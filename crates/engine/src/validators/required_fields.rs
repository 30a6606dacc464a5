use cometd_mock_core::Channel;
use serde_json::{Map, Value};

use super::Validator;
use crate::context::{Payload, RequestContext};
use crate::error::{ProtocolError, Rejection};
use crate::validators::request::{INVALID_PAYLOAD, ONLY_OBJECTS};

/// Required fields of `channel` that `fields` lacks, sorted.
pub(crate) fn missing_required_fields(channel: &Channel, fields: &Map<String, Value>) -> Vec<String> {
    channel
        .required_fields()
        .iter()
        .filter(|name| !fields.contains_key(**name))
        .map(|name| name.to_string())
        .collect()
}

/// Only checks the required fields of the first message's channel.
///
/// A lighter alternative to [`super::RequestValidator`], which already covers
/// this per message.
#[derive(Debug, Default)]
pub struct RequiredFieldsValidator;

impl Validator for RequiredFieldsValidator {
    fn name(&self) -> &'static str {
        "required_fields"
    }

    fn validate(&self, _ctx: &RequestContext<'_>, payload: &Payload) -> Result<(), Rejection> {
        if payload.value().is_none() {
            return Err(ProtocolError::Parse.into());
        }
        let Some(messages) = payload.messages() else {
            return Err(ProtocolError::PayloadShape(INVALID_PAYLOAD).into());
        };
        let Some(first) = messages[0].as_object() else {
            return Err(ProtocolError::PayloadShape(ONLY_OBJECTS).into());
        };

        let channel = first.get("channel");
        let Some(name) = channel.and_then(Value::as_str) else {
            return Ok(());
        };

        let missing = missing_required_fields(&Channel::parse(name), first);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Rejection::new(ProtocolError::MissingRequiredFields(missing))
                .at(channel.cloned(), first.get("id").cloned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use cometd_mock_core::SessionStore;
    use serde_json::json;

    use super::*;
    use crate::config::MockConfig;

    fn check(body: Value) -> Result<(), Rejection> {
        let config = MockConfig::default();
        let sessions = SessionStore::new();
        let ctx = RequestContext {
            config: &config,
            sessions: &sessions,
            now: chrono::Utc::now(),
        };
        RequiredFieldsValidator.validate(&ctx, &Payload::Parsed(body))
    }

    #[test]
    fn handshake_requires_id() {
        let rejection = check(json!([{ "channel": "/meta/handshake" }])).expect_err("id missing");

        assert_eq!(
            rejection.error,
            ProtocolError::MissingRequiredFields(vec!["id".to_string()])
        );
        assert_eq!(rejection.channel, Some(json!("/meta/handshake")));
    }

    #[test]
    fn missing_fields_are_sorted_and_joined() {
        let rejection = check(json!([{ "channel": "/meta/subscribe", "id": "1" }]))
            .expect_err("fields missing");

        assert_eq!(
            rejection.error.error_string(400),
            "401::clientId,subscription::missing_required_fields"
        );
        assert_eq!(rejection.id, Some(json!("1")));
    }

    #[test]
    fn only_the_first_message_is_checked() {
        assert!(check(json!([
            { "channel": "/meta/disconnect", "clientId": "a" },
            { "channel": "/meta/disconnect" }
        ]))
        .is_ok());
    }

    #[test]
    fn non_meta_channels_have_no_required_fields() {
        assert!(check(json!([{ "channel": "/chat/room" }])).is_ok());
    }
}
