//! Prompt assembly for issue analysis.
//!
//! The issue list is bounded before serialization: at most [`MAX_ISSUES`]
//! tickets, each description clipped to [`MAX_DESCRIPTION_CHARS`].

use serde::{Deserialize, Serialize};

use super::types::{ChatMessage, Role};
use crate::issues::IssueRecord;

pub const MAX_ISSUES: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Marker preceding the JSON issue list in the user message.
pub const ISSUES_HEADER: &str = "Jira issues (JSON):";

pub const SYSTEM_PROMPT: &str = "\
You are JiraMate, an assistant for product and project managers.
Answer only from the Jira issues provided. Do not invent issues, people, dates or metrics; \
if the data does not answer the question, say so.

Structure every answer in three sections:
1. Summary: the overall state of the work in two or three sentences.
2. At-risk items: each issue key that looks at risk, with the reason.
3. Suggested actions: concrete next steps for the team.";

/// The subset of an issue sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContext {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub status: String,
}

/// Truncate to the first [`MAX_ISSUES`] and project each issue, filling
/// blank fields with fixed placeholders.
#[must_use]
pub fn project_issues(issues: &[IssueRecord]) -> Vec<IssueContext> {
    issues
        .iter()
        .take(MAX_ISSUES)
        .map(|issue| IssueContext {
            key: or_placeholder(&issue.key, "N/A"),
            summary: or_placeholder(&issue.summary, "No summary"),
            description: clip_chars(
                &or_placeholder(issue.description.as_deref().unwrap_or_default(), "No description"),
                MAX_DESCRIPTION_CHARS,
            ),
            status: or_placeholder(&issue.status, "Unknown"),
        })
        .collect()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() { placeholder.to_string() } else { value.to_string() }
}

/// Keep at most `max` Unicode scalar values.
fn clip_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Build the system + user message pair for one analysis call.
#[must_use]
pub fn build_messages(prompt: &str, issues: &[IssueRecord]) -> Vec<ChatMessage> {
    let context = project_issues(issues);
    let issues_json = serde_json::to_string_pretty(&context).unwrap_or_else(|_| "[]".to_string());

    vec![
        ChatMessage { role: Role::System, content: SYSTEM_PROMPT.to_string() },
        ChatMessage { role: Role::User, content: format!("Question: {prompt}\n\n{ISSUES_HEADER}\n{issues_json}") },
    ]
}

/// Reply used in placeholder mode, when no gateway credential is configured.
#[must_use]
pub fn placeholder_reply(prompt: &str, issue_count: usize) -> String {
    format!(
        "[placeholder mode] No model credential configured. Prompt: \"{prompt}\". Issues analysed: {issue_count}."
    )
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
