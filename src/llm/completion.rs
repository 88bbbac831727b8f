//! Completion call contract shared by every backend.

use thiserror::Error;

use crate::conversation::ContextMessage;

/// Errors produced by a completion backend.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No API key was configured.
    #[error("API key not found. Please set HF_API_KEY")]
    MissingApiKey,
    /// Transport or decoding failure in the HTTP client.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("inference endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
    /// The response carried no choices.
    #[error("completion response had no choices")]
    MalformedResponse,
    /// The model answered with nothing.
    #[error("model returned an empty reply")]
    EmptyReply,
    /// The blocking worker running the call did not finish.
    #[error("completion worker failed: {0}")]
    Worker(String),
}

/// A single chat completion call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Model identifier understood by the endpoint.
    pub model: String,
    /// Rendered context window, system directive first.
    pub messages: Vec<ContextMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Blocking request/response completion backend.
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the reply text.
    ///
    /// # Errors
    /// Returns an error on configuration, network, auth, quota, or response failures.
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
