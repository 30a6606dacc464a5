//! HTTP surface of the mock.

pub mod cometd;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use cometd::{create_cometd_router, panic_response};
pub use state::AppState;

/// The full application: routes plus the panic, trace and CORS layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(create_cometd_router())
        .with_state(Arc::new(state))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
