//! Process configuration parsed from environment variables.
//!
//! `main` loads `.env` (if present) before calling [`AppConfig::from_env`].
//! Model settings live in [`crate::llm::config`].

use crate::services::chat_log::DEFAULT_MEMORY_LOG_MAX_ENTRIES;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CHAT_LOG_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_JIRA_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_JIRA_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("missing required env var {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueSourceConfig {
    Mock,
    Jira(JiraConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres URL for the chat log. `None` keeps the log in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub issue_source: IssueSourceConfig,
    pub chat_log_queue_capacity: usize,
    /// Entries retained by the in-memory chat log before the oldest is evicted.
    pub memory_log_max_entries: usize,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: in-memory chat log when absent
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `ISSUE_SOURCE`: `mock` (default) or `jira`
    /// - `JIRA_BASE_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`: required for `jira`
    /// - `CHAT_LOG_QUEUE_CAPACITY`: default 1024
    /// - `MEMORY_LOG_MAX_ENTRIES`: default 10000, only used without `DATABASE_URL`
    ///
    /// # Errors
    ///
    /// Returns an error for an unparsable port, an unknown issue source, or
    /// missing Jira credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid { key: "PORT", message: e.to_string() })?,
            Err(_) => DEFAULT_PORT,
        };
        let database_url = env_non_empty("DATABASE_URL");
        let issue_source = parse_issue_source(std::env::var("ISSUE_SOURCE").ok().as_deref())?;

        Ok(Self {
            port,
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            issue_source,
            chat_log_queue_capacity: env_parse("CHAT_LOG_QUEUE_CAPACITY", DEFAULT_CHAT_LOG_QUEUE_CAPACITY).max(1),
            memory_log_max_entries: env_parse("MEMORY_LOG_MAX_ENTRIES", DEFAULT_MEMORY_LOG_MAX_ENTRIES).max(1),
        })
    }
}

fn parse_issue_source(raw: Option<&str>) -> Result<IssueSourceConfig, ConfigError> {
    match raw.map(str::trim).unwrap_or("mock") {
        "" | "mock" => Ok(IssueSourceConfig::Mock),
        "jira" => Ok(IssueSourceConfig::Jira(JiraConfig {
            base_url: env_required("JIRA_BASE_URL")?,
            email: env_required("JIRA_EMAIL")?,
            api_token: env_required("JIRA_API_TOKEN")?,
            request_timeout_secs: env_parse("JIRA_REQUEST_TIMEOUT_SECS", DEFAULT_JIRA_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("JIRA_CONNECT_TIMEOUT_SECS", DEFAULT_JIRA_CONNECT_TIMEOUT_SECS),
        })),
        other => Err(ConfigError::Invalid {
            key: "ISSUE_SOURCE",
            message: format!("unknown source '{other}' (expected 'mock' or 'jira')"),
        }),
    }
}

/// Read `key` and parse it, falling back to `default` when unset or invalid.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Read `key`, treating an empty or whitespace-only value as unset.
pub(crate) fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env_non_empty(key).ok_or(ConfigError::Missing(key))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
