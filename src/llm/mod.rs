//! Model client: issue analysis through a hosted LLM gateway.
//!
//! DESIGN
//! ======
//! `ModelClient` runs in one of two named modes chosen at startup:
//! `Live` posts to an OpenRouter-compatible chat-completions endpoint,
//! `Placeholder` (no credential configured) answers locally without any
//! outbound call. Route handlers depend on the `ModelChat` trait so tests can
//! substitute a mock.

pub mod config;
pub mod openrouter;
pub mod prompt;
pub mod types;

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::issues::IssueRecord;
use config::LlmConfig;
use openrouter::OpenRouterClient;
use types::{LlmInitError, ModelError, ModelRequestBody};

// =============================================================================
// MODE
// =============================================================================

/// How the model client produces replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelMode {
    /// Replies come from the model gateway.
    Live,
    /// No credential: replies are synthesized locally.
    Placeholder,
}

// =============================================================================
// MODEL CHAT TRAIT
// =============================================================================

/// Provider-neutral analysis call. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ModelChat: Send + Sync {
    fn mode(&self) -> ModelMode;

    /// Ask the model about `issues` in light of `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] kind describing why no reply was produced.
    async fn analyze(&self, prompt: &str, issues: &[IssueRecord]) -> Result<String, ModelError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ModelClient {
    model: String,
    max_tokens: u32,
    temperature: f32,
    /// `None` in placeholder mode.
    gateway: Option<OpenRouterClient>,
}

impl ModelClient {
    /// Build a model client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_env() -> Result<Self, LlmInitError> {
        Self::from_config(LlmConfig::from_env())
    }

    /// Build a model client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmInitError> {
        let gateway = match &config.api_key {
            Some(key) => Some(OpenRouterClient::new(key.clone(), &config)?),
            None => None,
        };
        Ok(Self { model: config.model, max_tokens: config.max_tokens, temperature: config.temperature, gateway })
    }

    /// Return the configured model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request body for one analysis call.
    #[must_use]
    pub fn build_request(&self, prompt: &str, issues: &[IssueRecord]) -> ModelRequestBody {
        ModelRequestBody {
            model: self.model.clone(),
            messages: prompt::build_messages(prompt, issues),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait::async_trait]
impl ModelChat for ModelClient {
    fn mode(&self) -> ModelMode {
        if self.gateway.is_some() { ModelMode::Live } else { ModelMode::Placeholder }
    }

    async fn analyze(&self, prompt: &str, issues: &[IssueRecord]) -> Result<String, ModelError> {
        let Some(gateway) = &self.gateway else {
            return Ok(prompt::placeholder_reply(prompt, issues.len()));
        };

        let body = self.build_request(prompt, issues);
        let started = Instant::now();
        let completion = gateway.complete(&body).await?;

        if completion.truncated() {
            warn!(model = %completion.model, "model reply truncated at max_tokens; returning partial reply");
        }
        info!(
            model = %completion.model,
            prompt_tokens = completion.prompt_tokens,
            completion_tokens = completion.completion_tokens,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "model: reply received"
        );
        Ok(completion.text)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
