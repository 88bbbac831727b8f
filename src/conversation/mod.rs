//! Conversation subsystem for the Parley assistant.
//!
//! This module owns everything the assistant remembers between turns:
//! - `core`: Roles, content blocks, messages, configuration, and errors
//! - `storage`: Durable slots (atomic files, in-memory) backing the store
//! - `store`: The write-through conversation store and personality directive
//! - `context`: Bounded context-window rendering for completion calls

pub mod context;
pub mod core;
pub mod storage;
pub mod store;

pub use context::{ContextMessage, DEFAULT_CONTEXT_WINDOW, render_window};
pub use core::{
    ContentBlock, ConversationConfig, ConversationError, ConversationResult, DEFAULT_PERSONALITY,
    LoadWarning, Message, MessageContent, Role,
};
pub use storage::{DurableSlot, FileSlot, MemorySlot};
pub use store::ConversationStore;
