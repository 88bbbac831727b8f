//! Message content: typed blocks and the union accepted at the boundary.

use serde::{Deserialize, Serialize};

use crate::conversation::core::errors::{ConversationError, ConversationResult};

/// One unit of structured message content.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// Text payload.
        text: String,
    },
    /// Image referenced by URL (or data URL), passed through to vision models.
    ImageUrl {
        /// Image location.
        url: String,
    },
}

impl ContentBlock {
    /// Build a text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Build an image block.
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl { url: url.into() }
    }

    /// Borrow the text payload, if this is a text block.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }

    fn validate(&self) -> ConversationResult<()> {
        match self {
            Self::Text { text } if text.trim().is_empty() => Err(ConversationError::Validation(
                "text block is empty".to_string(),
            )),
            Self::ImageUrl { url } if url.trim().is_empty() => Err(
                ConversationError::Validation("image block has an empty url".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// Content as supplied by callers or found in older history files.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A bare string.
    Text(String),
    /// An ordered sequence of blocks.
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Validate and convert to the block form used everywhere downstream.
    ///
    /// # Errors
    /// Returns a validation error for blank text, an empty block list, or an
    /// empty block.
    pub fn normalize(self) -> ConversationResult<Vec<ContentBlock>> {
        let blocks = match self {
            Self::Text(text) => {
                if text.trim().is_empty() {
                    return Err(ConversationError::Validation(
                        "content is empty".to_string(),
                    ));
                }
                vec![ContentBlock::Text { text }]
            }
            Self::Blocks(blocks) => {
                if blocks.is_empty() {
                    return Err(ConversationError::Validation(
                        "content has no blocks".to_string(),
                    ));
                }
                blocks
            }
        };

        for block in &blocks {
            block.validate()?;
        }
        Ok(blocks)
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(value: Vec<ContentBlock>) -> Self {
        Self::Blocks(value)
    }
}

/// Concatenate the text blocks of a message, one per line.
#[must_use]
pub fn joined_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(ContentBlock::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}
