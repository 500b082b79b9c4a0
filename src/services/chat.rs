//! Chat service: one question about one project, answered once.
//!
//! DESIGN
//! ======
//! Each request runs a fixed sequential chain: fetch issues, ask the model,
//! record the exchange. A failure at either of the first two steps ends the
//! request before anything is logged. Logging itself is fire-and-forget (see
//! `chat_log`). Nothing is retried.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::chat_log::ConversationLogEntry;
use crate::error::ErrorCode;
use crate::issues::IssueError;
use crate::llm::types::ModelError;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

/// Body of `POST /api/chat`. Fields are optional on the wire so that a missing
/// field surfaces as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Issues(#[from] IssueError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::Issues(e) => e.error_code(),
            Self::Model(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::InvalidRequest(_) => false,
            Self::Issues(e) => e.retryable(),
            Self::Model(e) => e.retryable(),
        }
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Answer `request` and queue the exchange for the conversation log.
///
/// # Errors
///
/// Returns [`ChatError::InvalidRequest`] for a missing or blank field, and the
/// issue source or model error kind when either step fails.
pub async fn handle_chat(state: &AppState, request: ChatRequest) -> Result<ChatReply, ChatError> {
    let project_id = required(request.project_id, "projectId")?;
    let prompt = required(request.prompt, "prompt")?;
    info!(%project_id, prompt_len = prompt.len(), "chat: prompt received");

    let issues = state.issues.get_issues(&project_id).await.inspect_err(|e| {
        warn!(%project_id, source = state.issues.name(), error = %e, code = e.error_code(), "chat: issue fetch failed");
    })?;

    let reply = state.model.analyze(&prompt, &issues).await.inspect_err(|e| {
        warn!(%project_id, issues = issues.len(), error = %e, code = e.error_code(), "chat: model call failed");
    })?;

    state
        .chat_log
        .record(ConversationLogEntry::new(project_id.as_str(), prompt.as_str(), reply.as_str()));
    info!(%project_id, issues = issues.len(), reply_len = reply.len(), "chat: reply ready");

    Ok(ChatReply { reply })
}

fn required(value: Option<String>, field: &str) -> Result<String, ChatError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err(ChatError::InvalidRequest(format!("{field} must not be blank"))),
        None => Err(ChatError::InvalidRequest(format!("{field} is required"))),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
