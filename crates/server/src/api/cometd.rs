//! The Bayeux endpoint. Every request is a POST whose body is a JSON array of
//! messages; only the first message is answered.

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use cometd_mock_engine::{Body, Outcome, ProtocolError, Rejection};
use tracing::error;

use super::state::AppState;

pub fn create_cometd_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cometd", post(handle_cometd))
        // Some clients append the message type, e.g. /cometd/connect.
        .route("/cometd/{*message_type}", post(handle_cometd))
}

async fn handle_cometd(State(state): State<Arc<AppState>>, body: Bytes) -> CometdResponse {
    CometdResponse(state.dispatcher.dispatch(&body))
}

/// An [`Outcome`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct CometdResponse(pub Outcome);

impl IntoResponse for CometdResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.0.body {
            Body::Replies(replies) => (status, Json(replies)).into_response(),
            Body::Text(text) => (status, text).into_response(),
        }
    }
}

/// Turns a panic inside a request into the `500` protocol envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(error = %detail, "request handler panicked");

    // The validation status only matters for validation errors.
    let outcome = Rejection::new(ProtocolError::Internal(detail)).into_outcome(400);
    CometdResponse(outcome).into_response()
}
