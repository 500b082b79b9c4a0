//! Issue sources: where project tickets come from.
//!
//! DESIGN
//! ======
//! The chat service only sees the `IssueSource` trait. The shipped default is
//! `MockIssueSource`, a fixed two-ticket backlog; `JiraIssueSource` talks to a
//! real Jira Cloud instance. Records are fetched fresh for every request and
//! never cached.

pub mod jira;
pub mod mock;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::IssueSourceConfig;

// =============================================================================
// TYPES
// =============================================================================

/// A single ticket as reported by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    pub id: String,
    /// Human-readable ticket key, e.g. `PROJ-101`.
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("project not found: {0}")]
    NotFound(String),

    #[error("issue tracker unavailable: {0}")]
    Transient(String),

    #[error("issue tracker returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("issue tracker response parse failed: {0}")]
    Parse(String),
}

impl crate::error::ErrorCode for IssueError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_PROJECT_NOT_FOUND",
            Self::Transient(_) => "E_ISSUES_UNAVAILABLE",
            Self::Upstream { .. } => "E_ISSUES_UPSTREAM",
            Self::Parse(_) => "E_ISSUES_PARSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

// =============================================================================
// SOURCE TRAIT
// =============================================================================

/// Supplies the tickets of a project. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IssueSource: Send + Sync {
    /// Short name for logs and `/healthz` (e.g. `"mock"`).
    fn name(&self) -> &str;

    /// Fetch the issues of `project_id`.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError::NotFound`] for an unknown project and
    /// [`IssueError::Transient`] when the tracker cannot be reached.
    async fn get_issues(&self, project_id: &str) -> Result<Vec<IssueRecord>, IssueError>;
}

/// Build the configured issue source.
///
/// # Errors
///
/// Returns an error if the Jira HTTP client cannot be constructed.
pub fn from_config(config: IssueSourceConfig) -> Result<Arc<dyn IssueSource>, IssueError> {
    match config {
        IssueSourceConfig::Mock => Ok(Arc::new(mock::MockIssueSource)),
        IssueSourceConfig::Jira(jira) => Ok(Arc::new(jira::JiraIssueSource::new(jira)?)),
    }
}
