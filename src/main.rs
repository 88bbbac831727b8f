//! Terminal binary: talk to the assistant one line (utterance) at a time.
//! Run with: cargo run --bin parley

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use parley_agent::start_parley_agent;

/// Voice-style chat assistant in the terminal.
///
/// Each line read from stdin is one utterance. Say `exit.`, `clear.` or
/// `personality.` to control the session.
#[derive(Debug, Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// Model identifier (overrides PARLEY_MODEL).
    #[arg(long)]
    model: Option<String>,
    /// Conversation log file (overrides PARLEY_HISTORY_PATH).
    #[arg(long)]
    history: Option<PathBuf>,
    /// Personality file (overrides PARLEY_PERSONALITY_PATH).
    #[arg(long)]
    personality: Option<PathBuf>,
    /// Recent messages sent with each call (overrides PARLEY_CONTEXT_WINDOW).
    #[arg(long)]
    window: Option<usize>,
    /// Pause between printed characters of a reply; 0 prints at once.
    #[arg(long, default_value_t = 50)]
    typing_delay_ms: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    start_parley_agent::init_tracing();

    let mut conversation = start_parley_agent::conversation_config_from_env();
    let mut llm = start_parley_agent::llm_config_from_env();
    if let Some(model) = cli.model {
        llm.model = model;
    }
    if let Some(history) = cli.history {
        conversation.history_path = history;
    }
    if let Some(personality) = cli.personality {
        conversation.personality_path = personality;
    }
    if let Some(window) = cli.window {
        conversation.context_window = window;
    }

    start_parley_agent::run_terminal(
        &conversation,
        &llm,
        Duration::from_millis(cli.typing_delay_ms),
    )
}
