//! Configuration for the completion backend.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::llm::completion::CompletionError;

/// Default OpenAI-compatible router for hosted inference.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-11B-Vision-Instruct";
/// Default reply length limit.
pub const DEFAULT_MAX_TOKENS: u32 = 500;
/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Completion model settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: u32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Bearer token for the endpoint.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl LlmConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), CompletionError> {
        Url::parse(&self.base_url)
            .map_err(|err| CompletionError::InvalidConfig(format!("base_url: {err}")))?;

        if self.model.trim().is_empty() {
            return Err(CompletionError::InvalidConfig(
                "model must not be empty".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(CompletionError::InvalidConfig(
                "max_tokens must be > 0".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(CompletionError::InvalidConfig(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full chat completions endpoint.
    #[must_use]
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
