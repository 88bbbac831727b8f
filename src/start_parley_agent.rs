//! Startup helpers for the Parley binaries.
//!
//! Both binaries read their configuration from the environment, build one
//! [`Assistant`] and hand it to a front-end. The blocking HTTP client inside
//! the assistant is created and dropped outside the async runtime.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::conversation::{ConversationConfig, ConversationStore};
use crate::llm::{HuggingFaceClient, LlmConfig};
use crate::server::{self, AppState};
use crate::session::{Assistant, AssistantSettings, TerminalSession};
use crate::speech::LineTranscriptSource;

/// Initialize the global tracing subscriber.
///
/// Logs go to stderr so they never interleave with the terminal conversation.
/// Calling this more than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Conversation settings from `PARLEY_*` environment variables.
#[must_use]
pub fn conversation_config_from_env() -> ConversationConfig {
    conversation_config_from(|key| std::env::var(key).ok())
}

/// Completion settings from `PARLEY_*` environment variables and `HF_API_KEY`.
#[must_use]
pub fn llm_config_from_env() -> LlmConfig {
    llm_config_from(|key| std::env::var(key).ok())
}

fn conversation_config_from(lookup: impl Fn(&str) -> Option<String>) -> ConversationConfig {
    let mut config = ConversationConfig::default();
    if let Some(path) = lookup("PARLEY_HISTORY_PATH") {
        config.history_path = PathBuf::from(path);
    }
    if let Some(path) = lookup("PARLEY_PERSONALITY_PATH") {
        config.personality_path = PathBuf::from(path);
    }
    if let Some(window) = parse_var(&lookup, "PARLEY_CONTEXT_WINDOW") {
        config.context_window = window;
    }
    config
}

fn llm_config_from(lookup: impl Fn(&str) -> Option<String>) -> LlmConfig {
    let mut config = LlmConfig::default();
    if let Some(url) = lookup("PARLEY_INFERENCE_URL") {
        config.base_url = url;
    }
    if let Some(model) = lookup("PARLEY_MODEL") {
        config.model = model;
    }
    if let Some(max_tokens) = parse_var(&lookup, "PARLEY_MAX_TOKENS") {
        config.max_tokens = max_tokens;
    }
    config.api_key = lookup("HF_API_KEY").filter(|key| !key.trim().is_empty());
    config
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!("Ignoring {key}={raw:?}: not a valid number");
    }
    parsed
}

/// Get configured server port.
#[must_use]
pub fn get_port() -> u16 {
    std::env::var("PARLEY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}

/// Validate both configurations, load the conversation and connect the model.
///
/// # Errors
/// Returns an error if either configuration is invalid, the stored
/// conversation cannot be read, or no API key is configured.
pub fn build_assistant(
    conversation: &ConversationConfig,
    llm: &LlmConfig,
) -> anyhow::Result<Assistant> {
    let store = ConversationStore::open(conversation).with_context(|| {
        format!(
            "failed to open conversation at {}",
            conversation.history_path.display()
        )
    })?;
    let client = HuggingFaceClient::new(llm).context("failed to configure completion client")?;

    tracing::info!(
        "Loaded {} messages, model {}, window {}",
        store.len(),
        llm.model,
        conversation.context_window
    );

    Ok(Assistant::new(
        store,
        Arc::new(client),
        AssistantSettings::from_configs(conversation, llm),
    ))
}

/// Run the terminal front-end (used by the `parley` binary).
///
/// Utterances are read line by line from stdin.
///
/// # Returns
/// `ExitCode::SUCCESS` when the user leaves, `1` on failure.
#[must_use]
pub fn run_terminal(
    conversation: &ConversationConfig,
    llm: &LlmConfig,
    typing_delay: Duration,
) -> ExitCode {
    let mut assistant = match build_assistant(conversation, llm) {
        Ok(assistant) => assistant,
        Err(e) => {
            tracing::error!("Failed to start: {e:#}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let mut session = TerminalSession::new(io::stdout()).with_typing_delay(typing_delay);
    let result = rt.block_on(async {
        let mut source = LineTranscriptSource::stdin();
        session.run(&mut assistant, &mut source).await
    });
    // A pending stdin read would otherwise hold the runtime open.
    rt.shutdown_background();

    if let Err(e) = result {
        tracing::error!("Terminal error: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

/// Run the HTTP server (used by the `parley-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run_server() -> ExitCode {
    init_tracing();
    tracing::info!("Starting Parley Agent v{}", env!("CARGO_PKG_VERSION"));

    let llm = llm_config_from_env();
    tracing::info!("Inference endpoint: {}", llm.base_url);

    let state = match build_assistant(&conversation_config_from_env(), &llm) {
        Ok(assistant) => AppState::new(assistant),
        Err(e) => {
            tracing::error!("Failed to create state: {e:#}");
            return ExitCode::from(1);
        }
    };

    let port = get_port();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    if let Err(e) = rt.block_on(server::serve(Arc::clone(&state), addr, shutdown)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
