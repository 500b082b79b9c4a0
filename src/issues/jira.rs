//! Jira Cloud issue source.
//!
//! Thin wrapper over `GET /rest/api/2/search` (v2 returns descriptions as
//! plain strings). Parsing and status mapping are pure functions for
//! testability.

use std::time::Duration;

use serde::Deserialize;

use super::{IssueError, IssueRecord, IssueSource};
use crate::config::JiraConfig;

const MAX_RESULTS: &str = "50";
const SEARCH_FIELDS: &str = "summary,status,assignee,description";
const UNASSIGNED: &str = "Unassigned";

pub struct JiraIssueSource {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraIssueSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> Result<Self, IssueError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| IssueError::Transient(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email,
            api_token: config.api_token,
        })
    }
}

#[async_trait::async_trait]
impl IssueSource for JiraIssueSource {
    fn name(&self) -> &str {
        "jira"
    }

    async fn get_issues(&self, project_id: &str) -> Result<Vec<IssueRecord>, IssueError> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        let jql = project_jql(project_id);

        let response = self
            .http
            .get(url)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&[("jql", jql.as_str()), ("maxResults", MAX_RESULTS), ("fields", SEARCH_FIELDS)])
            .send()
            .await
            .map_err(|e| IssueError::Transient(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| IssueError::Transient(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(status_to_error(status, &text, project_id));
        }

        parse_search_response(&text)
    }
}

fn project_jql(project_id: &str) -> String {
    let escaped = project_id.replace('\\', "\\\\").replace('"', "\\\"");
    format!("project = \"{escaped}\" ORDER BY created DESC")
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    summary: Option<String>,
    status: Option<NamedField>,
    assignee: Option<AssigneeField>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssigneeField {
    display_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    #[serde(default)]
    error_messages: Vec<String>,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_search_response(json: &str) -> Result<Vec<IssueRecord>, IssueError> {
    let search: SearchResponse = serde_json::from_str(json).map_err(|e| IssueError::Parse(e.to_string()))?;

    Ok(search
        .issues
        .into_iter()
        .map(|issue| IssueRecord {
            id: issue.id,
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_default(),
            status: issue
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_default(),
            assignee: issue
                .fields
                .assignee
                .map_or_else(|| UNASSIGNED.to_string(), |a| a.display_name),
            description: issue.fields.description.filter(|d| !d.trim().is_empty()),
        })
        .collect())
}

pub(crate) fn status_to_error(status: u16, body: &str, project_id: &str) -> IssueError {
    match status {
        // Jira answers 400 when the JQL names a project that does not exist.
        400 | 404 => IssueError::NotFound(project_id.to_string()),
        429 | 500..=599 => IssueError::Transient(format!("status {status}")),
        _ => {
            let message = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|e| e.error_messages.into_iter().next())
                .unwrap_or_else(|| body.to_string());
            IssueError::Upstream { status, message }
        }
    }
}

#[cfg(test)]
#[path = "jira_test.rs"]
mod tests;
