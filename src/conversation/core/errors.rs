//! Error types for the conversation subsystem.

use std::fmt;

use thiserror::Error;

/// Conversation subsystem error type.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Rejected input (role, content, or personality) before any mutation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Durable storage could not be read or written.
    #[error("persistence error on {slot}: {source}")]
    Persistence {
        /// Human-readable description of the slot.
        slot: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConversationError {
    /// Build a persistence error for the given slot.
    #[must_use]
    pub fn persistence(slot: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            slot: slot.into(),
            source,
        }
    }
}

/// Convenience result alias for conversation operations.
pub type ConversationResult<T> = Result<T, ConversationError>;

/// Non-fatal problem found while hydrating a store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadWarning {
    /// The persisted log was unreadable; the store started empty.
    CorruptLog {
        /// Slot that held the corrupt log.
        slot: String,
        /// Parser or decoder message.
        reason: String,
    },
    /// The personality slot was unreadable; the default directive is in use.
    CorruptPersonality {
        /// Slot that held the corrupt directive.
        slot: String,
        /// Decoder message.
        reason: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptLog { slot, reason } => {
                write!(f, "could not load history from {slot}, starting fresh: {reason}")
            }
            Self::CorruptPersonality { slot, reason } => {
                write!(f, "could not load personality from {slot}, using default: {reason}")
            }
        }
    }
}
