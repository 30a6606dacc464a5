use cometd_mock_core::Channel;
use serde_json::Value;

use super::{Validator, missing_required_fields};
use crate::context::{Payload, RequestContext};
use crate::error::{ProtocolError, Rejection};

pub(crate) const INVALID_PAYLOAD: &str = "invalid_payload";
pub(crate) const ONLY_OBJECTS: &str = "payload_must_contain_only_json_objects";
pub(crate) const INVALID_CHANNEL: &str = "message_must_have_a_channel_field_starting_with_/";
pub(crate) const INVALID_CLIENT_ID: &str = "message_requires_a_string_clientid_field";
pub(crate) const INVALID_SUBSCRIPTION: &str =
    "message_requires_a_subscription_field_(string_or_array_of_strings)";
pub(crate) const INVALID_CONNECTION_TYPE: &str = "message_requires_a_string_connectiontype_field";

/// Structural validation of a whole batch.
///
/// Per message, in order: it is an object, its channel is a string starting
/// with `/`, the channel's required fields are present, non-handshake messages
/// carry a string `clientId`, and channel-specific fields have the right type.
/// One bad message rejects the batch.
#[derive(Debug, Default)]
pub struct RequestValidator;

impl Validator for RequestValidator {
    fn name(&self) -> &'static str {
        "request"
    }

    fn validate(&self, _ctx: &RequestContext<'_>, payload: &Payload) -> Result<(), Rejection> {
        if payload.value().is_none() {
            return Err(ProtocolError::Parse.into());
        }
        let Some(messages) = payload.messages() else {
            return Err(ProtocolError::PayloadShape(INVALID_PAYLOAD).into());
        };

        for message in messages {
            validate_message(message)?;
        }
        Ok(())
    }
}

fn validate_message(message: &Value) -> Result<(), Rejection> {
    let Some(fields) = message.as_object() else {
        return Err(ProtocolError::PayloadShape(ONLY_OBJECTS).into());
    };

    let raw_channel = fields.get("channel");
    let id = fields.get("id");
    let reject = |error: ProtocolError| {
        Err(Rejection::new(error).at(raw_channel.cloned(), id.cloned()))
    };

    let Some(name) = raw_channel
        .and_then(Value::as_str)
        .filter(|name| name.starts_with('/'))
    else {
        return reject(ProtocolError::InvalidField(INVALID_CHANNEL));
    };
    let channel = Channel::parse(name);

    let missing = missing_required_fields(&channel, fields);
    if !missing.is_empty() {
        return reject(ProtocolError::MissingRequiredFields(missing));
    }

    if !channel.is_handshake() && !fields.get("clientId").is_some_and(Value::is_string) {
        return reject(ProtocolError::InvalidField(INVALID_CLIENT_ID));
    }

    match channel {
        Channel::Subscribe | Channel::Unsubscribe
            if !fields.get("subscription").is_some_and(is_subscription) =>
        {
            reject(ProtocolError::InvalidField(INVALID_SUBSCRIPTION))
        }
        Channel::Connect if !fields.get("connectionType").is_some_and(Value::is_string) => {
            reject(ProtocolError::InvalidField(INVALID_CONNECTION_TYPE))
        }
        _ => Ok(()),
    }
}

fn is_subscription(value: &Value) -> bool {
    match value {
        Value::String(_) => true,
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use cometd_mock_core::SessionStore;
    use serde_json::json;

    use super::*;
    use crate::config::MockConfig;

    fn check(payload: Payload) -> Result<(), Rejection> {
        let config = MockConfig::default();
        let sessions = SessionStore::new();
        let ctx = RequestContext {
            config: &config,
            sessions: &sessions,
            now: chrono::Utc::now(),
        };
        RequestValidator.validate(&ctx, &payload)
    }

    fn check_json(body: Value) -> Result<(), Rejection> {
        check(Payload::Parsed(body))
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let rejection = check(Payload::parse(b"{not json")).expect_err("parse error");

        assert_eq!(rejection.error, ProtocolError::Parse);
        assert_eq!(rejection.channel, None);
    }

    #[test]
    fn payload_must_be_a_non_empty_list() {
        for body in [json!([]), json!({ "channel": "/meta/handshake" }), json!("x")] {
            let rejection = check_json(body).expect_err("invalid payload");
            assert_eq!(rejection.error, ProtocolError::PayloadShape(INVALID_PAYLOAD));
        }
    }

    #[test]
    fn elements_must_be_objects() {
        let rejection = check_json(json!([{ "channel": "/meta/handshake", "id": "1" }, 5]))
            .expect_err("non-object element");

        assert_eq!(rejection.error, ProtocolError::PayloadShape(ONLY_OBJECTS));
    }

    #[test]
    fn channel_must_start_with_slash() {
        let rejection = check_json(json!([{ "channel": "meta/connect", "id": "3" }]))
            .expect_err("bad channel");

        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_CHANNEL));
        assert_eq!(rejection.channel, Some(json!("meta/connect")));
        assert_eq!(rejection.id, Some(json!("3")));

        let rejection = check_json(json!([{ "id": "4" }])).expect_err("no channel");
        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_CHANNEL));
        assert_eq!(rejection.channel, None);
    }

    #[test]
    fn missing_client_id_on_meta_channel_is_a_missing_field() {
        let rejection =
            check_json(json!([{ "channel": "/meta/disconnect" }])).expect_err("missing clientId");

        assert_eq!(
            rejection.error.error_string(400),
            "401::clientId::missing_required_fields"
        );
    }

    #[test]
    fn client_id_must_be_a_string() {
        let rejection = check_json(json!([{ "channel": "/meta/disconnect", "clientId": 12 }]))
            .expect_err("numeric clientId");
        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_CLIENT_ID));

        let rejection =
            check_json(json!([{ "channel": "/chat/room" }])).expect_err("no clientId on data channel");
        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_CLIENT_ID));
    }

    #[test]
    fn subscription_must_be_string_or_list_of_strings() {
        assert!(check_json(json!([{
            "channel": "/meta/subscribe", "clientId": "a", "subscription": ["/a", "/b"]
        }]))
        .is_ok());

        let rejection = check_json(json!([{
            "channel": "/meta/unsubscribe", "clientId": "a", "subscription": ["/a", 1]
        }]))
        .expect_err("mixed list");
        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_SUBSCRIPTION));
    }

    #[test]
    fn connect_requires_connection_type() {
        let rejection = check_json(json!([{ "channel": "/meta/connect", "clientId": "a", "id": "1" }]))
            .expect_err("no connectionType");

        assert_eq!(rejection.error, ProtocolError::InvalidField(INVALID_CONNECTION_TYPE));
    }

    #[test]
    fn every_message_of_the_batch_is_checked() {
        let rejection = check_json(json!([
            { "channel": "/meta/handshake", "id": "1" },
            { "channel": "/meta/connect", "clientId": "a", "connectionType": "long-polling" }
        ]))
        .expect_err("second message lacks id");

        assert_eq!(
            rejection.error,
            ProtocolError::MissingRequiredFields(vec!["id".to_string()])
        );
        assert_eq!(rejection.channel, Some(json!("/meta/connect")));
    }

    #[test]
    fn well_formed_handshake_passes() {
        assert!(check_json(json!([{
            "id": "1",
            "channel": "/meta/handshake",
            "version": "1.0",
            "supportedConnectionTypes": ["long-polling"]
        }]))
        .is_ok());
    }
}
