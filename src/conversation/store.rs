//! Write-through conversation store.

use std::io;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::conversation::context::{ContextMessage, render_window};
use crate::conversation::core::config::ConversationConfig;
use crate::conversation::core::content::MessageContent;
use crate::conversation::core::errors::{ConversationError, ConversationResult, LoadWarning};
use crate::conversation::core::message::{Message, now_timestamp};
use crate::conversation::core::role::Role;
use crate::conversation::storage::{DurableSlot, FileSlot};

/// Owns the ordered conversation log and the personality directive of one session.
///
/// Every mutation is written to durable storage before it returns. When a
/// write fails the in-memory state is left as it was after the last
/// successful write. Construction always hydrates from storage, so an
/// instance is ready to use as soon as it exists.
pub struct ConversationStore {
    log_slot: Box<dyn DurableSlot>,
    personality_slot: Box<dyn DurableSlot>,
    messages: Vec<Message>,
    personality: String,
    default_personality: String,
    warnings: Vec<LoadWarning>,
}

impl ConversationStore {
    /// Open a file-backed store from configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or storage exists but
    /// cannot be read. Corrupt content is not an error; see [`Self::load_warnings`].
    pub fn open(config: &ConversationConfig) -> ConversationResult<Self> {
        config.validate()?;
        Self::with_slots(
            FileSlot::new(&config.history_path),
            FileSlot::new(&config.personality_path),
            &config.default_personality,
        )
    }

    /// Build a store over arbitrary slots and load their contents.
    ///
    /// # Errors
    /// Returns an error if the default directive is blank or a slot cannot be read.
    pub fn with_slots(
        log_slot: impl DurableSlot + 'static,
        personality_slot: impl DurableSlot + 'static,
        default_personality: &str,
    ) -> ConversationResult<Self> {
        let default_personality = default_personality.trim();
        if default_personality.is_empty() {
            return Err(ConversationError::Validation(
                "default personality is empty".to_string(),
            ));
        }

        let mut store = Self {
            log_slot: Box::new(log_slot),
            personality_slot: Box::new(personality_slot),
            messages: Vec::new(),
            personality: default_personality.to_string(),
            default_personality: default_personality.to_string(),
            warnings: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Messages in conversation order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of logged messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current personality directive.
    #[must_use]
    pub fn personality(&self) -> &str {
        &self.personality
    }

    /// Problems found while loading, each already logged as a warning.
    #[must_use]
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Record a message and persist the full log.
    ///
    /// # Errors
    /// Returns a validation error for empty content (nothing changes), or a
    /// persistence error if the log could not be written (the append is rolled back).
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<MessageContent>,
    ) -> ConversationResult<Message> {
        let message = Message::new(role, content, self.next_timestamp())?;
        self.messages.push(message.clone());

        if let Err(err) = self.persist() {
            self.messages.pop();
            warn!("Rolled back {role} message after failed write: {err}");
            return Err(err);
        }

        debug!("Appended {role} message, log now holds {}", self.messages.len());
        Ok(message)
    }

    /// Directive entry followed by the last `window` messages, content in block form.
    #[must_use]
    pub fn render_context(&self, window: usize) -> Vec<ContextMessage> {
        render_window(&self.personality, &self.messages, window)
    }

    /// Overwrite durable storage with the current log.
    ///
    /// # Errors
    /// Returns an error if serialization or the atomic write fails.
    pub fn persist(&self) -> ConversationResult<()> {
        let json = serde_json::to_string_pretty(&self.messages)?;
        self.log_slot
            .write(&json)
            .map_err(|err| ConversationError::persistence(self.log_slot.describe(), err))
    }

    /// Drop every message and remove the durable log. Clearing twice is fine.
    ///
    /// # Errors
    /// Returns a persistence error if the stored log could not be removed; the
    /// in-memory log is then left untouched.
    pub fn clear(&mut self) -> ConversationResult<()> {
        self.log_slot
            .remove()
            .map_err(|err| ConversationError::persistence(self.log_slot.describe(), err))?;

        let dropped = self.messages.len();
        self.messages.clear();
        info!("Cleared conversation history ({dropped} messages)");
        Ok(())
    }

    /// Replace the personality directive and persist it. The log is not touched.
    ///
    /// # Errors
    /// Returns a validation error for blank input, or a persistence error if the
    /// directive could not be written (the previous directive stays active).
    pub fn update_personality(&mut self, directive: &str) -> ConversationResult<()> {
        let directive = directive.trim();
        if directive.is_empty() {
            return Err(ConversationError::Validation(
                "personality is empty".to_string(),
            ));
        }

        self.personality_slot
            .write(directive)
            .map_err(|err| ConversationError::persistence(self.personality_slot.describe(), err))?;

        self.personality = directive.to_string();
        info!("Personality updated");
        Ok(())
    }

    fn next_timestamp(&self) -> NaiveDateTime {
        let now = now_timestamp();
        self.messages
            .last()
            .map_or(now, |last| now.max(last.timestamp()))
    }

    fn load(&mut self) -> ConversationResult<()> {
        self.messages = self.load_log()?;
        self.personality = self.load_personality()?;
        Ok(())
    }

    fn load_log(&mut self) -> ConversationResult<Vec<Message>> {
        let slot = self.log_slot.describe();
        let raw = match self.log_slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No history at {slot}, starting empty");
                return Ok(Vec::new());
            }
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                self.record(LoadWarning::CorruptLog {
                    slot,
                    reason: err.to_string(),
                });
                return Ok(Vec::new());
            }
            Err(err) => return Err(ConversationError::persistence(slot, err)),
        };

        // Blank files hold no messages and are not reported as corrupt.
        if raw.trim().is_empty() {
            debug!("History at {slot} is blank, starting empty");
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) => {
                info!("Loaded {} messages from {slot}", messages.len());
                Ok(messages)
            }
            Err(err) => {
                self.record(LoadWarning::CorruptLog {
                    slot,
                    reason: err.to_string(),
                });
                Ok(Vec::new())
            }
        }
    }

    fn load_personality(&mut self) -> ConversationResult<String> {
        let slot = self.personality_slot.describe();
        match self.personality_slot.read() {
            Ok(Some(raw)) if !raw.trim().is_empty() => Ok(raw.trim().to_string()),
            Ok(_) => Ok(self.default_personality.clone()),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                self.record(LoadWarning::CorruptPersonality {
                    slot,
                    reason: err.to_string(),
                });
                Ok(self.default_personality.clone())
            }
            Err(err) => Err(ConversationError::persistence(slot, err)),
        }
    }

    fn record(&mut self, warning: LoadWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::core::config::DEFAULT_PERSONALITY;
    use crate::conversation::core::content::ContentBlock;
    use crate::conversation::storage::MemorySlot;

    fn memory_store() -> (ConversationStore, MemorySlot, MemorySlot) {
        let log = MemorySlot::new();
        let personality = MemorySlot::new();
        let store =
            ConversationStore::with_slots(log.clone(), personality.clone(), DEFAULT_PERSONALITY)
                .unwrap();
        (store, log, personality)
    }

    #[test]
    fn test_scenario_renders_directive_then_history() {
        let (mut store, _, _) = memory_store();
        store.append(Role::User, "hello").unwrap();
        store.append(Role::Assistant, "hi there").unwrap();

        let rendered = store.render_context(10);
        assert_eq!(
            rendered,
            vec![
                ContextMessage::system(DEFAULT_PERSONALITY),
                ContextMessage {
                    role: Role::User,
                    content: vec![ContentBlock::text("hello")],
                },
                ContextMessage {
                    role: Role::Assistant,
                    content: vec![ContentBlock::text("hi there")],
                },
            ]
        );
    }

    #[test]
    fn test_appended_message_is_last_rendered_entry() {
        let (mut store, _, _) = memory_store();
        for i in 0..14 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let appended = store.append(role, format!("turn {i}")).unwrap();
            for window in 1..4 {
                let rendered = store.render_context(window);
                assert_eq!(rendered.last(), Some(&ContextMessage::from(&appended)));
            }
        }
        assert_eq!(store.render_context(10).len(), 11);
        assert_eq!(store.render_context(100).len(), 15);
    }

    #[test]
    fn test_append_writes_through() {
        let (mut store, log, _) = memory_store();
        store.append(Role::User, "persist me").unwrap();

        assert_eq!(log.write_count(), 1);
        let stored = log.contents().unwrap();
        let reloaded: Vec<Message> = serde_json::from_str(&stored).unwrap();
        assert_eq!(reloaded, store.messages());
    }

    #[test]
    fn test_invalid_content_changes_nothing() {
        let (mut store, log, _) = memory_store();
        assert!(matches!(
            store.append(Role::User, "   "),
            Err(ConversationError::Validation(_))
        ));
        assert!(store.append(Role::User, Vec::<ContentBlock>::new()).is_err());
        assert!(store.is_empty());
        assert_eq!(log.write_count(), 0);
    }

    #[test]
    fn test_failed_write_rolls_back_append() {
        let (mut store, log, _) = memory_store();
        store.append(Role::User, "kept").unwrap();
        log.set_fail_writes(true);

        let err = store.append(Role::Assistant, "lost").unwrap_err();
        assert!(matches!(err, ConversationError::Persistence { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text(), "kept");

        let stored: Vec<Message> = serde_json::from_str(&log.contents().unwrap()).unwrap();
        assert_eq!(stored, store.messages());
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let (mut store, _, _) = memory_store();
        for i in 0..20 {
            store.append(Role::User, format!("m{i}")).unwrap();
        }
        assert!(
            store
                .messages()
                .windows(2)
                .all(|pair| pair[0].timestamp() <= pair[1].timestamp())
        );
    }

    #[test]
    fn test_clear_is_destructive_and_idempotent() {
        let (mut store, log, _) = memory_store();
        store.append(Role::User, "one").unwrap();
        store.append(Role::Assistant, "two").unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.is_empty());
        assert!(log.contents().is_none());
        assert_eq!(
            store.render_context(10),
            vec![ContextMessage::system(DEFAULT_PERSONALITY)]
        );
    }

    #[test]
    fn test_failed_clear_keeps_log() {
        let (mut store, log, _) = memory_store();
        store.append(Role::User, "one").unwrap();
        log.set_fail_writes(true);

        assert!(store.clear().is_err());
        assert_eq!(store.len(), 1);
        assert!(log.contents().is_some());
    }

    #[test]
    fn test_corrupt_log_starts_empty_with_warning() {
        let log = MemorySlot::with_contents("{ not json");
        let store =
            ConversationStore::with_slots(log, MemorySlot::new(), DEFAULT_PERSONALITY).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.load_warnings().len(), 1);
        assert!(matches!(
            store.load_warnings()[0],
            LoadWarning::CorruptLog { .. }
        ));
    }

    #[test]
    fn test_log_with_unknown_role_is_corrupt() {
        let log = MemorySlot::with_contents(
            r#"[{"role":"narrator","content":"x","timestamp":"2024-01-01 00:00:00"}]"#,
        );
        let store =
            ConversationStore::with_slots(log, MemorySlot::new(), DEFAULT_PERSONALITY).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.load_warnings().len(), 1);
    }

    #[test]
    fn test_loads_mixed_content_shapes() {
        let log = MemorySlot::with_contents(
            r#"[
                {"role":"user","content":[{"kind":"text","text":"hello"}],"timestamp":"2024-01-01 10:00:00"},
                {"role":"assistant","content":"hi there","timestamp":"2024-01-01 10:00:02"}
            ]"#,
        );
        let store =
            ConversationStore::with_slots(log, MemorySlot::new(), DEFAULT_PERSONALITY).unwrap();

        assert!(store.load_warnings().is_empty());
        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[1].content(), &[ContentBlock::text("hi there")]);
    }

    #[test]
    fn test_personality_update_leaves_log_alone() {
        let (mut store, log, personality) = memory_store();
        store.append(Role::User, "hello").unwrap();
        let before = store.messages().to_vec();
        let writes = log.write_count();

        store.update_personality("  Talk like a pirate.  ").unwrap();

        assert_eq!(store.personality(), "Talk like a pirate.");
        assert_eq!(personality.contents().as_deref(), Some("Talk like a pirate."));
        assert_eq!(store.messages(), before.as_slice());
        assert_eq!(log.write_count(), writes);
        assert_eq!(
            store.render_context(10)[0],
            ContextMessage::system("Talk like a pirate.")
        );
    }

    #[test]
    fn test_personality_update_validation_and_failure() {
        let (mut store, _, personality) = memory_store();
        assert!(matches!(
            store.update_personality(" \n "),
            Err(ConversationError::Validation(_))
        ));

        personality.set_fail_writes(true);
        assert!(store.update_personality("New voice").is_err());
        assert_eq!(store.personality(), DEFAULT_PERSONALITY);
    }

    #[test]
    fn test_loads_saved_personality() {
        let personality = MemorySlot::with_contents("Be terse.\n");
        let store =
            ConversationStore::with_slots(MemorySlot::new(), personality, DEFAULT_PERSONALITY)
                .unwrap();
        assert_eq!(store.personality(), "Be terse.");

        let blank = MemorySlot::with_contents("   ");
        let store =
            ConversationStore::with_slots(MemorySlot::new(), blank, DEFAULT_PERSONALITY).unwrap();
        assert_eq!(store.personality(), DEFAULT_PERSONALITY);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversationConfig {
            history_path: dir.path().join("history.json"),
            personality_path: dir.path().join("personality.txt"),
            ..ConversationConfig::default()
        };

        let mut store = ConversationStore::open(&config).unwrap();
        store.append(Role::User, "hello").unwrap();
        store
            .append(
                Role::User,
                vec![
                    ContentBlock::text("what is this?"),
                    ContentBlock::image_url("https://example.com/cat.png"),
                ],
            )
            .unwrap();
        store.append(Role::Assistant, "a cat").unwrap();
        store.update_personality("Be playful.").unwrap();

        let reopened = ConversationStore::open(&config).unwrap();
        assert_eq!(reopened.messages(), store.messages());
        assert_eq!(reopened.personality(), "Be playful.");
        assert!(reopened.load_warnings().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_next_append() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversationConfig {
            history_path: dir.path().join("history.json"),
            personality_path: dir.path().join("personality.txt"),
            ..ConversationConfig::default()
        };
        std::fs::write(&config.history_path, "[{\"role\": ").unwrap();

        let mut store = ConversationStore::open(&config).unwrap();
        assert_eq!(store.load_warnings().len(), 1);
        store.append(Role::User, "fresh start").unwrap();

        let reopened = ConversationStore::open(&config).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.load_warnings().is_empty());
    }

    #[test]
    fn test_blank_default_personality_is_rejected() {
        assert!(ConversationStore::with_slots(MemorySlot::new(), MemorySlot::new(), " ").is_err());
    }

    fn file_config(dir: &std::path::Path) -> ConversationConfig {
        ConversationConfig {
            history_path: dir.join("history.json"),
            personality_path: dir.join("personality.txt"),
            ..ConversationConfig::default()
        }
    }

    #[test]
    fn test_undecodable_history_file_starts_empty_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());
        std::fs::write(&config.history_path, [0xff, 0xfe]).unwrap();

        let store = ConversationStore::open(&config).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.render_context(10).len(), 1);
        assert!(matches!(
            store.load_warnings(),
            [LoadWarning::CorruptLog { slot, .. }] if slot.contains("history.json")
        ));
    }

    #[test]
    fn test_undecodable_personality_file_uses_default_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());
        std::fs::write(&config.personality_path, [0xff, 0xfe]).unwrap();

        let store = ConversationStore::open(&config).unwrap();
        assert_eq!(store.personality(), DEFAULT_PERSONALITY);
        assert!(matches!(
            store.load_warnings(),
            [LoadWarning::CorruptPersonality { slot, .. }] if slot.contains("personality.txt")
        ));
    }

    #[test]
    fn test_blank_history_file_is_empty_without_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(dir.path());

        for blank in ["", "  \n\t"] {
            std::fs::write(&config.history_path, blank).unwrap();
            let store = ConversationStore::open(&config).unwrap();
            assert!(store.is_empty());
            assert!(store.load_warnings().is_empty());
        }
    }
}
