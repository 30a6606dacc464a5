//! Channel handlers. Each builds the reply for the first message of a batch that
//! made it through validation and the adapters.

use cometd_mock_api_types::{Advice, LONG_POLLING, PROTOCOL_VERSION, Reconnect, Reply};
use cometd_mock_core::{
    CONNECT, ConnectTally, Connect, DISCONNECT, Disconnect, HANDSHAKE, Handshake, Message,
    SUBSCRIBE, SubscriptionChange, UNSUBSCRIBE,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::error::ProtocolError;

pub type HandlerResult = Result<Reply, ProtocolError>;

/// Dispatches `message` to the handler of its channel.
pub fn route(ctx: &RequestContext<'_>, message: &Message) -> HandlerResult {
    match message {
        Message::Handshake(handshake_message) => handshake(ctx, handshake_message),
        Message::Connect(connect_message) => connect(ctx, connect_message),
        Message::Subscribe(change) => subscription_change(ctx, change, SUBSCRIBE, "2"),
        Message::Unsubscribe(change) => subscription_change(ctx, change, UNSUBSCRIBE, "3"),
        Message::Disconnect(disconnect_message) => disconnect(ctx, disconnect_message),
        Message::Other(other) => {
            let channel = match &other.channel {
                Some(Value::String(name)) => name.clone(),
                Some(raw) => raw.to_string(),
                None => String::new(),
            };
            Err(ProtocolError::UnknownChannel(channel))
        }
    }
}

/// Always opens a new session; any `clientId` the client sent is ignored.
pub fn handshake(ctx: &RequestContext<'_>, message: &Handshake) -> HandlerResult {
    let session = ctx.sessions.open(ctx.now)?;
    info!(client_id = %session.client_id, "handshake accepted");

    let mut reply = Reply::success(HANDSHAKE)
        .with_id(id_or(&message.id, "0"))
        .with_client_id(Some(session.client_id.to_string()))
        .with_advice(Advice {
            reconnect: Some(Reconnect::Retry),
            interval: Some(0),
            timeout: Some(ctx.config.connect_timeout),
        });
    reply.version = Some(PROTOCOL_VERSION.to_string());
    reply.supported_connection_types = Some(vec![LONG_POLLING.to_string()]);
    Ok(reply)
}

/// Counts the connect and answers immediately; nothing is ever held open.
pub fn connect(ctx: &RequestContext<'_>, message: &Connect) -> HandlerResult {
    let policy = ctx.config.reconnect_policy();
    let tally = match message.client_id.as_deref() {
        Some(client_id) => match ctx.sessions.register_connect(client_id, &policy, ctx.now) {
            Ok(tally) => Some(tally),
            Err(_) if ctx.config.no_validation => None,
            Err(err) => return Err(err.into()),
        },
        None if ctx.config.no_validation => None,
        None => return Err(ProtocolError::UnknownClientId("null".to_string())),
    };

    if tally == Some(ConnectTally::ReconnectAdvised) {
        info!(client_id = ?message.client_id, "reconnection interval exceeded, advising reconnect");
        return Ok(reconnect_advice(
            Value::from(CONNECT),
            message.id.clone(),
            message.client_id.clone(),
        ));
    }

    debug!(client_id = ?message.client_id, ?tally, "connect accepted");
    Ok(Reply::success(CONNECT)
        .with_id(id_or(&message.id, "1"))
        .with_client_id(message.client_id.clone())
        .with_advice(Advice {
            reconnect: message.reconnect.clone(),
            interval: Some(ctx.config.connect_interval),
            timeout: Some(ctx.config.connect_timeout),
        }))
}

/// Subscribe and unsubscribe only echo; no subscription state is kept.
pub fn subscription_change(
    ctx: &RequestContext<'_>,
    message: &SubscriptionChange,
    channel: &'static str,
    default_id: &'static str,
) -> HandlerResult {
    require_session(ctx, message.client_id.as_deref())?;
    debug!(client_id = ?message.client_id, channel, subscription = ?message.subscription, "subscription change");

    let mut reply = Reply::success(channel)
        .with_id(id_or(&message.id, default_id))
        .with_client_id(message.client_id.clone());
    reply.subscription = Some(message.subscription.clone().unwrap_or_default());
    Ok(reply)
}

pub fn disconnect(ctx: &RequestContext<'_>, message: &Disconnect) -> HandlerResult {
    match message.client_id.as_deref() {
        Some(client_id) => match ctx.sessions.close(client_id) {
            Ok(_) => info!(client_id, "client disconnected"),
            Err(_) if ctx.config.no_validation => {}
            Err(err) => return Err(err.into()),
        },
        None if ctx.config.no_validation => {}
        None => return Err(ProtocolError::UnknownClientId("null".to_string())),
    }

    Ok(Reply::success(DISCONNECT)
        .with_id(id_or(&message.id, "4"))
        .with_client_id(message.client_id.clone()))
}

/// The successful reply that tells a client to reconnect instead of the
/// normal channel response.
pub fn reconnect_advice(channel: Value, id: Option<Value>, client_id: Option<String>) -> Reply {
    Reply::success(channel)
        .with_id(Some(id.unwrap_or_else(|| Value::from("1"))))
        .with_client_id(client_id)
        .with_advice(Advice::reconnect(Reconnect::Retry))
}

/// With validation on, the client must hold an active session. With it off,
/// anything goes.
fn require_session(ctx: &RequestContext<'_>, client_id: Option<&str>) -> Result<(), ProtocolError> {
    if ctx.config.no_validation {
        return Ok(());
    }
    ctx.sessions
        .require(client_id.unwrap_or("null"))
        .map(|_| ())
        .map_err(ProtocolError::from)
}

fn id_or(id: &Option<Value>, default: &str) -> Option<Value> {
    Some(id.clone().unwrap_or_else(|| Value::from(default)))
}
