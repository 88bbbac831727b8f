//! One conversational turn, end to end.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::conversation::{ConversationConfig, ConversationResult, ConversationStore, Role};
use crate::llm::{CompletionClient, CompletionError, CompletionRequest, LlmConfig};
use crate::session::command::SessionCommand;

/// Per-session completion settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssistantSettings {
    /// Model identifier passed to the backend.
    pub model: String,
    /// Reply length limit.
    pub max_tokens: u32,
    /// Messages sent with each call, not counting the directive.
    pub context_window: usize,
}

impl AssistantSettings {
    /// Combine the relevant parts of both configurations.
    #[must_use]
    pub fn from_configs(conversation: &ConversationConfig, llm: &LlmConfig) -> Self {
        Self {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            context_window: conversation.context_window,
        }
    }
}

/// The assistant's answer to one utterance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Reply {
    /// Text shown or spoken to the user (also what was recorded).
    pub text: String,
    /// Whether the completion failed and `text` describes the failure.
    pub is_error: bool,
}

/// Result of handling one utterance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TurnOutcome {
    /// The user asked to end the session.
    Exit,
    /// History was wiped.
    Cleared,
    /// The front-end should collect a new personality directive.
    PersonalityRequested,
    /// Nothing was recognized; nothing was recorded.
    Silence,
    /// The model (or the error policy) produced a reply.
    Replied(Reply),
}

/// A chat session: the conversation store plus the completion backend.
pub struct Assistant {
    store: ConversationStore,
    client: Arc<dyn CompletionClient>,
    settings: AssistantSettings,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("settings", &self.settings)
            .field("messages", &self.store.len())
            .field("personality", &self.store.personality())
            .finish_non_exhaustive()
    }
}

impl Assistant {
    /// Assemble a session.
    #[must_use]
    pub fn new(
        store: ConversationStore,
        client: Arc<dyn CompletionClient>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            store,
            client,
            settings,
        }
    }

    /// Read access to the conversation store.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Completion settings.
    #[must_use]
    pub const fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Dispatch an utterance: commands act on the store, anything else is answered.
    ///
    /// # Errors
    /// Returns an error if the store rejects or fails to persist a change.
    pub async fn handle(&mut self, utterance: &str) -> ConversationResult<TurnOutcome> {
        match SessionCommand::parse(utterance) {
            SessionCommand::Exit => Ok(TurnOutcome::Exit),
            SessionCommand::Clear => {
                self.clear()?;
                Ok(TurnOutcome::Cleared)
            }
            SessionCommand::Personality => Ok(TurnOutcome::PersonalityRequested),
            SessionCommand::Silence => Ok(TurnOutcome::Silence),
            SessionCommand::Utterance(text) => self.respond(&text).await.map(TurnOutcome::Replied),
        }
    }

    /// Record the user's text, ask the model, and record the answer.
    ///
    /// A failed completion is not an error here: it becomes an assistant
    /// message `"Error: <description>"` and a reply flagged `is_error`.
    ///
    /// # Errors
    /// Returns an error if the text is empty or the store cannot persist.
    pub async fn respond(&mut self, text: &str) -> ConversationResult<Reply> {
        self.store.append(Role::User, text)?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: self.store.render_context(self.settings.context_window),
            max_tokens: self.settings.max_tokens,
        };
        let client = Arc::clone(&self.client);
        let outcome = tokio::task::spawn_blocking(move || client.complete(&request))
            .await
            .unwrap_or_else(|err| Err(CompletionError::Worker(err.to_string())));

        let reply = match outcome {
            Ok(text) => Reply {
                text,
                is_error: false,
            },
            Err(err) => {
                warn!("Completion failed: {err}");
                Reply {
                    text: format!("Error: {err}"),
                    is_error: true,
                }
            }
        };

        self.store.append(Role::Assistant, reply.text.as_str())?;
        debug!("Turn complete, {} messages logged", self.store.len());
        Ok(reply)
    }

    /// Wipe the conversation history.
    ///
    /// # Errors
    /// Returns an error if the stored log cannot be removed.
    pub fn clear(&mut self) -> ConversationResult<()> {
        self.store.clear()
    }

    /// Replace the personality directive.
    ///
    /// # Errors
    /// Returns an error for blank input or if the directive cannot be persisted.
    pub fn update_personality(&mut self, directive: &str) -> ConversationResult<()> {
        self.store.update_personality(directive)
    }
}
