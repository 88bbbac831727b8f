//! Terminal front-end loop.

use std::io::{self, Write};
use std::time::Duration;

use tracing::{error, info};

use crate::session::assistant::{Assistant, Reply, TurnOutcome};
use crate::speech::TranscriptSource;

/// Consecutive producer failures tolerated before the loop gives up.
const MAX_SOURCE_FAILURES: usize = 3;

/// Drives an [`Assistant`] from a transcript source and writes the
/// conversation to a terminal-like writer.
pub struct TerminalSession<W> {
    out: W,
    typing_delay: Duration,
}

impl<W: Write> TerminalSession<W> {
    /// Write to `out` with replies printed at once.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            typing_delay: Duration::ZERO,
        }
    }

    /// Print replies one character at a time with this pause between characters.
    #[must_use]
    pub const fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Run until the user says `exit.` or the source is exhausted.
    ///
    /// Store and completion failures are reported inline and the loop continues.
    ///
    /// # Errors
    /// Returns an error only if writing to the terminal fails.
    pub async fn run<S>(&mut self, assistant: &mut Assistant, source: &mut S) -> io::Result<()>
    where
        S: TranscriptSource + ?Sized,
    {
        self.line(
            "Listening. Say \"exit.\" to quit, \"clear.\" to forget, \"personality.\" to change how I talk.",
        )?;
        for warning in assistant.store().load_warnings() {
            self.line(&format!("Warning: {warning}"))?;
        }

        let mut failures = 0_usize;
        loop {
            let utterance = match source.next_utterance().await {
                Ok(Some(utterance)) => {
                    failures = 0;
                    utterance
                }
                Ok(None) => break,
                Err(err) => {
                    error!("Transcript source failed: {err}");
                    self.line(&format!("Error with speech input: {err}"))?;
                    failures += 1;
                    if failures >= MAX_SOURCE_FAILURES {
                        break;
                    }
                    continue;
                }
            };

            if !utterance.trim().is_empty() {
                self.line(&format!("You: {}", utterance.trim()))?;
            }

            match assistant.handle(&utterance).await {
                Ok(TurnOutcome::Exit) => break,
                Ok(TurnOutcome::Cleared) => self.line("Conversation history cleared!")?,
                Ok(TurnOutcome::PersonalityRequested) => {
                    self.collect_personality(assistant, source).await?;
                }
                Ok(TurnOutcome::Silence) => self.line("No speech detected. Please try again.")?,
                Ok(TurnOutcome::Replied(reply)) => self.write_reply(&reply).await?,
                Err(err) => {
                    error!("Turn failed: {err}");
                    self.line(&format!("An error occurred: {err}"))?;
                }
            }
        }

        info!("Terminal session finished");
        self.line("Goodbye!")
    }

    async fn collect_personality<S>(
        &mut self,
        assistant: &mut Assistant,
        source: &mut S,
    ) -> io::Result<()>
    where
        S: TranscriptSource + ?Sized,
    {
        self.line("Enter new personality:")?;
        match source.next_utterance().await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                match assistant.update_personality(&text) {
                    Ok(()) => self.line("Personality updated!"),
                    Err(err) => self.line(&format!("Could not update personality: {err}")),
                }
            }
            Ok(_) => self.line("Personality unchanged."),
            Err(err) => self.line(&format!("Error with speech input: {err}")),
        }
    }

    async fn write_reply(&mut self, reply: &Reply) -> io::Result<()> {
        write!(self.out, "Assistant: ")?;
        if self.typing_delay.is_zero() {
            write!(self.out, "{}", reply.text)?;
        } else {
            for ch in reply.text.chars() {
                write!(self.out, "{ch}")?;
                self.out.flush()?;
                tokio::time::sleep(self.typing_delay).await;
            }
        }
        self.line("")
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }
}
