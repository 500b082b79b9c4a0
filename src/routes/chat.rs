//! Chat route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use crate::error::ErrorBody;
use crate::issues::IssueError;
use crate::llm::types::ModelError;
use crate::services::chat::{self, ChatError, ChatReply, ChatRequest};
use crate::state::AppState;

/// `POST /api/chat`: answer a question about a project's issues.
pub async fn post_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    let Json(request) = body.map_err(|rejection| ChatError::InvalidRequest(rejection.body_text()))?;
    let reply = chat::handle_chat(&state, request).await?;
    Ok(Json(reply))
}

pub(crate) fn chat_error_to_status(err: &ChatError) -> StatusCode {
    match err {
        ChatError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ChatError::Issues(IssueError::NotFound(_)) => StatusCode::NOT_FOUND,
        ChatError::Issues(IssueError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::Issues(_) => StatusCode::BAD_GATEWAY,
        ChatError::Model(ModelError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        ChatError::Model(ModelError::Unknown(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ChatError::Model(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = chat_error_to_status(&self);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "chat request failed");
        }
        (status, Json(ErrorBody::from_error(&self))).into_response()
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
