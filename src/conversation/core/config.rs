//! Configuration for the conversation subsystem.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::conversation::context::DEFAULT_CONTEXT_WINDOW;
use crate::conversation::core::errors::{ConversationError, ConversationResult};

/// Directive used when no personality has been saved yet.
pub const DEFAULT_PERSONALITY: &str =
    "You are a helpful assistant. Answer questions clearly and concisely.";

/// Storage and rendering settings for a conversation store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// JSON file holding the conversation log.
    pub history_path: PathBuf,
    /// Plain-text file holding the personality directive.
    pub personality_path: PathBuf,
    /// Number of recent messages sent with each completion call.
    pub context_window: usize,
    /// Directive used when the personality file is absent or blank.
    pub default_personality: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("conversation_history.json"),
            personality_path: PathBuf::from("personality.txt"),
            context_window: DEFAULT_CONTEXT_WINDOW,
            default_personality: DEFAULT_PERSONALITY.to_string(),
        }
    }
}

impl ConversationConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConversationResult<()> {
        if self.context_window == 0 {
            return Err(ConversationError::InvalidConfig(
                "context_window must be > 0".to_string(),
            ));
        }

        if self.history_path.as_os_str().is_empty() {
            return Err(ConversationError::InvalidConfig(
                "history_path must not be empty".to_string(),
            ));
        }

        if self.personality_path.as_os_str().is_empty() {
            return Err(ConversationError::InvalidConfig(
                "personality_path must not be empty".to_string(),
            ));
        }

        if self.history_path == self.personality_path {
            return Err(ConversationError::InvalidConfig(
                "history_path and personality_path must differ".to_string(),
            ));
        }

        if self.default_personality.trim().is_empty() {
            return Err(ConversationError::InvalidConfig(
                "default_personality must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}
