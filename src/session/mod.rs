//! Conversational session layer shared by the terminal and browser front-ends.
//!
//! - `command`: Voice command recognition (`exit.`, `clear.`, `personality.`)
//! - `assistant`: One full turn: record, render, complete, record the reply
//! - `terminal`: The terminal front-end loop

pub mod assistant;
pub mod command;
pub mod terminal;

#[cfg(test)]
pub(crate) mod testing;

pub use assistant::{Assistant, AssistantSettings, Reply, TurnOutcome};
pub use command::SessionCommand;
pub use terminal::TerminalSession;
