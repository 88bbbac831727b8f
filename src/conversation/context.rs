//! Context-window rendering for completion calls.

use serde::{Deserialize, Serialize};

use crate::conversation::core::content::ContentBlock;
use crate::conversation::core::message::Message;
use crate::conversation::core::role::Role;

/// Number of recent messages sent when the caller does not choose.
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// A role/content pair ready to hand to a completion endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    /// Author role.
    pub role: Role,
    /// Normalized content blocks.
    pub content: Vec<ContentBlock>,
}

impl ContextMessage {
    /// System entry carrying the personality directive as one text block.
    #[must_use]
    pub fn system(directive: &str) -> Self {
        Self {
            role: Role::System,
            content: vec![ContentBlock::text(directive)],
        }
    }
}

impl From<&Message> for ContextMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            content: message.content().to_vec(),
        }
    }
}

/// Render the directive followed by the last `window` messages, oldest first.
///
/// Always returns `min(messages.len(), window) + 1` entries.
#[must_use]
pub fn render_window(directive: &str, messages: &[Message], window: usize) -> Vec<ContextMessage> {
    let start = messages.len().saturating_sub(window);
    let recent = &messages[start..];

    let mut out = Vec::with_capacity(recent.len() + 1);
    out.push(ContextMessage::system(directive));
    out.extend(recent.iter().map(ContextMessage::from));
    out
}
