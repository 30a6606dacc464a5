use cometd_mock_api_types::{ERROR_CHANNEL, Reconnect, Reply};
use cometd_mock_core::SessionError;
use serde_json::Value;
use thiserror::Error;

use crate::outcome::Outcome;

/// Failures while assembling the dispatcher.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown validator: {0}")]
    UnknownValidator(String),

    #[error("unknown adapter: {0}")]
    UnknownAdapter(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Why a single request was not served normally. Displays as the part of the
/// wire error string that follows the leading code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("bad_request,JSON_parse_error")]
    Parse,

    #[error("bad_request,{0}")]
    PayloadShape(&'static str),

    #[error("{}::missing_required_fields", .0.join(","))]
    MissingRequiredFields(Vec<String>),

    #[error("bad_request,{0}")]
    InvalidField(&'static str),

    #[error("{0}::unknown_client_id")]
    UnknownClientId(String),

    #[error("Unknown Channel")]
    UnknownChannel(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// HTTP status the failure is answered with.
    pub fn http_status(&self, validation_status: u16) -> u16 {
        match self {
            Self::Parse
            | Self::PayloadShape(_)
            | Self::MissingRequiredFields(_)
            | Self::InvalidField(_) => validation_status,
            // Same status whichever layer notices the client is gone.
            Self::UnknownClientId(_) => 200,
            Self::UnknownChannel(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Code that prefixes the error string inside the envelope.
    pub fn wire_code(&self, validation_status: u16) -> u16 {
        match self {
            Self::MissingRequiredFields(_) | Self::UnknownClientId(_) => 401,
            other => other.http_status(validation_status),
        }
    }

    pub fn reconnect(&self) -> Reconnect {
        match self {
            Self::UnknownClientId(_) => Reconnect::Handshake,
            _ => Reconnect::None,
        }
    }

    pub fn error_string(&self, validation_status: u16) -> String {
        format!("{}::{self}", self.wire_code(validation_status))
    }
}

impl From<SessionError> for ProtocolError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnknownClientId(client_id) => Self::UnknownClientId(client_id),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// A [`ProtocolError`] plus the message context echoed into the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error: ProtocolError,
    pub channel: Option<Value>,
    pub id: Option<Value>,
}

impl Rejection {
    pub fn new(error: ProtocolError) -> Self {
        Self {
            error,
            channel: None,
            id: None,
        }
    }

    pub fn at(mut self, channel: Option<Value>, id: Option<Value>) -> Self {
        self.channel = channel;
        self.id = id;
        self
    }

    pub fn into_outcome(self, validation_status: u16) -> Outcome {
        let channel = self
            .channel
            .filter(|channel| !channel.is_null())
            .unwrap_or_else(|| Value::from(ERROR_CHANNEL));
        let reply = Reply::failure(
            channel,
            self.error.error_string(validation_status),
            self.error.reconnect(),
        )
        .with_id(self.id);

        Outcome::with_status(self.error.http_status(validation_status), reply)
    }
}

impl From<ProtocolError> for Rejection {
    fn from(error: ProtocolError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_strings_follow_wire_format() {
        assert_eq!(
            ProtocolError::Parse.error_string(400),
            "400::bad_request,JSON_parse_error"
        );
        assert_eq!(
            ProtocolError::MissingRequiredFields(vec!["clientId".into(), "id".into()])
                .error_string(400),
            "401::clientId,id::missing_required_fields"
        );
        assert_eq!(
            ProtocolError::UnknownClientId("ghost".into()).error_string(400),
            "401::ghost::unknown_client_id"
        );
        assert_eq!(
            ProtocolError::UnknownChannel("/foo".into()).error_string(400),
            "404::Unknown Channel"
        );
        assert_eq!(
            ProtocolError::Internal("boom".into()).error_string(400),
            "500::Internal Server Error: boom"
        );
    }

    #[test]
    fn unknown_client_is_answered_with_200_and_handshake_advice() {
        let outcome = Rejection::new(ProtocolError::UnknownClientId("ghost".into()))
            .at(Some(json!("/meta/connect")), Some(json!("9")))
            .into_outcome(400);

        assert_eq!(outcome.status, 200);
        let reply = outcome.reply().expect("json reply");
        assert!(!reply.successful);
        assert_eq!(reply.channel, json!("/meta/connect"));
        assert_eq!(reply.id, Some(json!("9")));
        assert_eq!(
            reply.advice.as_ref().and_then(|advice| advice.reconnect.clone()),
            Some(Reconnect::Handshake)
        );
    }

    #[test]
    fn rejection_without_channel_uses_error_channel() {
        let outcome = Rejection::new(ProtocolError::Parse).into_outcome(422);

        assert_eq!(outcome.status, 422);
        let reply = outcome.reply().expect("json reply");
        assert_eq!(reply.channel, json!("/meta/error"));
        assert_eq!(reply.error.as_deref(), Some("422::bad_request,JSON_parse_error"));
    }

    #[test]
    fn session_errors_map_to_protocol_errors() {
        let unknown: ProtocolError = SessionError::UnknownClientId("x".into()).into();
        assert_eq!(unknown, ProtocolError::UnknownClientId("x".into()));

        let duplicate: ProtocolError =
            SessionError::DuplicateClientId(cometd_mock_core::ClientId::new()).into();
        assert!(matches!(duplicate, ProtocolError::Internal(_)));
    }
}
