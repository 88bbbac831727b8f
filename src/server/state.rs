//! Application state shared across all request handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::session::Assistant;

/// Shared application state.
///
/// The assistant sits behind one async mutex: a chat turn holds it from the
/// user append to the assistant append, so turns never interleave and readers
/// never observe a half-finished turn. The lock is shared so a turn can be
/// moved onto its own task and finish after the requesting client is gone.
pub struct AppState {
    /// The single chat session served by this process.
    pub assistant: Arc<Mutex<Assistant>>,
    /// Model name reported to clients.
    pub model_name: String,
}

impl AppState {
    /// Wrap an assistant for sharing across handlers.
    #[must_use]
    pub fn new(assistant: Assistant) -> Arc<Self> {
        let model_name = assistant.settings().model.clone();
        Arc::new(Self {
            assistant: Arc::new(Mutex::new(assistant)),
            model_name,
        })
    }
}
