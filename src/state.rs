//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the three collaborators of a chat request, each built once in
//! `main` and shared read-only behind an `Arc`. There is no per-request
//! shared mutable state.

use std::sync::Arc;

use crate::issues::IssueSource;
use crate::llm::ModelChat;
use crate::services::chat_log::ChatLogger;

/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub issues: Arc<dyn IssueSource>,
    pub model: Arc<dyn ModelChat>,
    pub chat_log: ChatLogger,
}

impl AppState {
    #[must_use]
    pub fn new(issues: Arc<dyn IssueSource>, model: Arc<dyn ModelChat>, chat_log: ChatLogger) -> Self {
        Self { issues, model, chat_log }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
