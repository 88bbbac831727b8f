//! Hosted completion endpoint: client trait, configuration and the Hugging Face client.

pub mod completion;
pub mod config;
pub mod hugging_face;

pub use completion::{CompletionClient, CompletionError, CompletionRequest};
pub use config::LlmConfig;
pub use hugging_face::HuggingFaceClient;
