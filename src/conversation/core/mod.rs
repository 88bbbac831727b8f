//! Core conversation types.

pub mod config;
pub mod content;
pub mod errors;
pub mod message;
pub mod role;

pub use config::{ConversationConfig, DEFAULT_PERSONALITY};
pub use content::{ContentBlock, MessageContent, joined_text};
pub use errors::{ConversationError, ConversationResult, LoadWarning};
pub use message::{Message, TIMESTAMP_FORMAT};
pub use role::Role;
