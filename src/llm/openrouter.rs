//! OpenRouter-compatible chat-completions client.
//!
//! Thin HTTP wrapper for `POST {base_url}/chat/completions`. One attempt per
//! call. Transport failures are classified into [`ModelError`] kinds; reply
//! extraction lives in `parse_completion` for testability.

use reqwest::StatusCode;
use serde_json::Value;

use super::config::{LlmConfig, LlmTimeouts};
use super::types::{Completion, LlmInitError, ModelError, ModelRequestBody};

/// Reply fields tried in order on `choices[0].message`.
const REPLY_FIELDS: [&str; 4] = ["content", "reasoning", "text", "message"];

pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String, config: &LlmConfig) -> Result<Self, LlmInitError> {
        Ok(Self {
            http: build_http(config.timeouts)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    /// Send one chat-completions request and parse the first choice.
    ///
    /// # Errors
    ///
    /// Returns the [`ModelError`] kind for a transport failure, a non-2xx
    /// status, an undecodable body, or a reply with no usable text.
    pub async fn complete(&self, body: &ModelRequestBody) -> Result<Completion, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self.http.post(url).bearer_auth(&self.api_key).json(body);
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            request = request.header("X-Title", title);
        }

        let response = request.send().await.map_err(|e| classify_transport_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| classify_transport_error(&e))?;

        if !status.is_success() {
            return Err(upstream_error(status, &text));
        }

        parse_completion(&text)
    }
}

fn build_http(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmInitError> {
    reqwest::Client::builder()
        .timeout(timeouts.request)
        .connect_timeout(timeouts.connect)
        .build()
        .map_err(|e| LlmInitError::HttpClientBuild(e.to_string()))
}

// =============================================================================
// ERROR CLASSIFICATION
// =============================================================================

/// Map a reqwest failure onto the model error taxonomy.
///
/// Timeout is checked first: a connect timeout is both a timeout and a
/// connect error.
pub(crate) fn classify_transport_error(err: &reqwest::Error) -> ModelError {
    if err.is_timeout() {
        ModelError::Timeout
    } else if err.is_connect() {
        ModelError::NetworkUnreachable(root_cause(err))
    } else if err.is_request() || err.is_body() {
        ModelError::NoResponse(root_cause(err))
    } else {
        ModelError::Unknown(err.to_string())
    }
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Build an `UpstreamError`, preferring the gateway's `error.message`.
pub(crate) fn upstream_error(status: StatusCode, body: &str) -> ModelError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|root| {
            root.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_owned)
        });
    ModelError::UpstreamError { status: status.as_u16(), message }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_completion(json_text: &str) -> Result<Completion, ModelError> {
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| ModelError::Unknown(format!("completion parse failed: {e}")))?;
    let model = root
        .get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let prompt_tokens = root
        .get("usage")
        .and_then(|u| u.get("prompt_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let completion_tokens = root
        .get("usage")
        .and_then(|u| u.get("completion_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(ModelError::EmptyResponse);
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let message = choice.get("message").unwrap_or(&Value::Null);

    let Some(text) = extract_reply(message) else {
        return Err(ModelError::EmptyResponse);
    };

    Ok(Completion { text, finish_reason, model, prompt_tokens, completion_tokens })
}

/// First non-blank reply field, in [`REPLY_FIELDS`] order.
pub(crate) fn extract_reply(message: &Value) -> Option<String> {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| message.get(*field))
        .filter_map(field_text)
        .find(|text| !text.trim().is_empty())
}

/// A field is either a plain string or an array of `{type, text}` parts.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>(),
        ),
        _ => None,
    }
}

#[cfg(test)]
#[path = "openrouter_test.rs"]
mod tests;
