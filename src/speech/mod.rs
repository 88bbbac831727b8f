//! Transcript producers.
//!
//! A producer yields one finished utterance at a time. Speech recognition
//! itself lives outside this crate; any recognizer that can emit a line of
//! text per utterance (or a person typing) plugs in through [`TranscriptSource`].

#[cfg(test)]
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Boxed future type for transcript producers.
pub type TranscriptFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors raised while waiting for an utterance.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The underlying stream failed.
    #[error("transcript stream error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of finished utterances.
pub trait TranscriptSource: Send {
    /// Wait for the next utterance.
    ///
    /// Yields `Some(text)` for each utterance (an empty string when nothing
    /// was recognized) and `None` once the source is exhausted.
    ///
    /// # Errors
    /// Returns an error if the producer fails; callers may keep polling.
    fn next_utterance(&mut self) -> TranscriptFuture<'_, Result<Option<String>, SpeechError>>;
}

/// Reads one utterance per line from an async reader such as stdin or a
/// recognizer's output pipe.
pub struct LineTranscriptSource<R> {
    reader: R,
}

impl<R> LineTranscriptSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Wrap a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineTranscriptSource<tokio::io::BufReader<tokio::io::Stdin>> {
    /// Read utterances from standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(tokio::io::BufReader::new(tokio::io::stdin()))
    }
}

impl<R> TranscriptSource for LineTranscriptSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn next_utterance(&mut self) -> TranscriptFuture<'_, Result<Option<String>, SpeechError>> {
        Box::pin(async move {
            let mut line = String::new();
            let read = self.reader.read_line(&mut line).await?;
            if read == 0 {
                return Ok(None);
            }
            Ok(Some(line.trim().to_string()))
        })
    }
}

/// Replays a fixed list of utterances, then reports exhaustion.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedTranscriptSource {
    utterances: VecDeque<String>,
}

#[cfg(test)]
impl ScriptedTranscriptSource {
    pub(crate) fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            utterances: utterances.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
impl TranscriptSource for ScriptedTranscriptSource {
    fn next_utterance(&mut self) -> TranscriptFuture<'_, Result<Option<String>, SpeechError>> {
        let next = self.utterances.pop_front();
        Box::pin(async move { Ok(next) })
    }
}
