//! Model client configuration parsed from environment variables.

use std::time::Duration;

use crate::config::{env_non_empty, env_parse};

pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_MODEL: &str = "nvidia/nemotron-nano-9b-v2";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Gateway credential. `None` selects placeholder mode.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Optional OpenRouter attribution headers (`HTTP-Referer`, `X-Title`).
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: LlmTimeouts::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            referer: None,
            title: None,
        }
    }
}

impl LlmConfig {
    /// Build typed model config from environment variables.
    ///
    /// All optional:
    /// - `LLM_API_KEY_ENV`: names the env var holding the key (default `OPENROUTER_API_KEY`)
    /// - `LLM_MODEL`: default `nvidia/nemotron-nano-9b-v2`
    /// - `LLM_BASE_URL`: default OpenRouter API base URL
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LLM_MAX_TOKENS`: default 2000
    /// - `LLM_TEMPERATURE`: default 0.2
    /// - `LLM_REFERER`, `LLM_TITLE`: attribution headers
    #[must_use]
    pub fn from_env() -> Self {
        let key_var = env_non_empty("LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());

        Self {
            api_key: env_non_empty(&key_var),
            model: env_non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env_non_empty("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeouts: LlmTimeouts {
                request: Duration::from_secs(env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)),
                connect: Duration::from_secs(env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)),
            },
            max_tokens: env_parse("LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            temperature: env_parse("LLM_TEMPERATURE", DEFAULT_TEMPERATURE),
            referer: env_non_empty("LLM_REFERER"),
            title: env_non_empty("LLM_TITLE"),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
