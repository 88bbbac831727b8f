//! Voice command recognition.

/// What a finished utterance asks the session to do.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionCommand {
    /// `exit.`: end the session.
    Exit,
    /// `clear.`: wipe the conversation history.
    Clear,
    /// `personality.`: the next utterance becomes the new directive.
    Personality,
    /// Nothing was recognized.
    Silence,
    /// Anything else is sent to the model.
    Utterance(String),
}

impl SessionCommand {
    /// Classify an utterance. Commands match case-insensitively, ignoring
    /// surrounding whitespace, and must include the trailing period that
    /// recognizers add to short phrases.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Silence;
        }

        match trimmed.to_lowercase().as_str() {
            "exit." => Self::Exit,
            "clear." => Self::Clear,
            "personality." => Self::Personality,
            _ => Self::Utterance(trimmed.to_string()),
        }
    }
}
