use std::sync::Arc;

use cometd_mock_engine::Dispatcher;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline; owns the session store every request shares.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}
