//! Blocking client for Hugging Face's OpenAI-compatible chat completions API.
//!
//! Behaviour:
//! - `POST {base_url}/chat/completions` with a bearer token.
//! - Content blocks are sent in the OpenAI part format (`type: text`, `type: image_url`).
//! - The first choice's message content is the reply.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conversation::{ContentBlock, ContextMessage};
use crate::llm::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::llm::config::LlmConfig;

/// Connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest error body kept in `CompletionError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: WireImage<'a> },
}

#[derive(Debug, Serialize)]
struct WireImage<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl<'a> ChatRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages.iter().map(WireMessage::from_context).collect(),
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

impl<'a> WireMessage<'a> {
    fn from_context(message: &'a ContextMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content.iter().map(WirePart::from_block).collect(),
        }
    }
}

impl<'a> WirePart<'a> {
    fn from_block(block: &'a ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => Self::Text { text },
            ContentBlock::ImageUrl { url } => Self::ImageUrl {
                image_url: WireImage { url },
            },
        }
    }
}

fn extract_reply(response: ChatResponse) -> Result<String, CompletionError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::MalformedResponse)?;
    let text = choice.message.content.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(CompletionError::EmptyReply);
    }
    Ok(text)
}

/// Blocking Hugging Face inference client.
pub struct HuggingFaceClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HuggingFaceClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the API key is
    /// missing, or the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, CompletionError> {
        config.validate()?;
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(CompletionError::MissingApiKey)?
            .to_string();

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key,
        })
    }
}

impl CompletionClient for HuggingFaceClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest::from_request(request);
        debug!(
            "Requesting completion from {} with {} messages",
            request.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        extract_reply(response.json::<ChatResponse>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[test]
    fn test_wire_format_uses_openai_parts() {
        let request = CompletionRequest {
            model: "some/model".to_string(),
            messages: vec![
                ContextMessage::system("be brief"),
                ContextMessage {
                    role: Role::User,
                    content: vec![
                        ContentBlock::text("what is this?"),
                        ContentBlock::image_url("https://example.com/a.png"),
                    ],
                },
            ],
            max_tokens: 500,
        };

        let json = serde_json::to_value(ChatRequest::from_request(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "some/model",
                "messages": [
                    {"role": "system", "content": [{"type": "text", "text": "be brief"}]},
                    {"role": "user", "content": [
                        {"type": "text", "text": "what is this?"},
                        {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
                    ]}
                ],
                "max_tokens": 500,
                "stream": false
            })
        );
    }

    #[test]
    fn test_extracts_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(response).unwrap(), "Hello!");
    }

    #[test]
    fn test_empty_or_missing_choices_are_errors() {
        let none: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_reply(none),
            Err(CompletionError::MalformedResponse)
        ));

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(extract_reply(blank), Err(CompletionError::EmptyReply)));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let config = LlmConfig::default();
        assert!(matches!(
            HuggingFaceClient::new(&config),
            Err(CompletionError::MissingApiKey)
        ));

        let blank = LlmConfig {
            api_key: Some("  ".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(
            HuggingFaceClient::new(&blank),
            Err(CompletionError::MissingApiKey)
        ));
    }
}
