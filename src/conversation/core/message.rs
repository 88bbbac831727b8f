//! Message model for the conversation log.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::conversation::core::content::{ContentBlock, MessageContent, joined_text};
use crate::conversation::core::errors::{ConversationError, ConversationResult};
use crate::conversation::core::role::Role;

/// Timestamp layout used in the durable log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single role-tagged entry of the conversation log.
///
/// Content is always held in block form; bare strings are wrapped on the way in.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredMessage")]
pub struct Message {
    role: Role,
    content: Vec<ContentBlock>,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: NaiveDateTime,
}

impl Message {
    /// Build a validated message.
    ///
    /// # Errors
    /// Returns a validation error if the content is empty.
    pub fn new(
        role: Role,
        content: impl Into<MessageContent>,
        timestamp: NaiveDateTime,
    ) -> ConversationResult<Self> {
        let content = content.into().normalize()?;
        Ok(Self {
            role,
            content,
            timestamp: timestamp.trunc_subsecs(0),
        })
    }

    /// Role of the author.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Normalized content blocks.
    #[must_use]
    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    /// Time the message was recorded, at whole-second precision.
    #[must_use]
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Text blocks joined by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        joined_text(&self.content)
    }
}

/// Current local time at the precision the log stores.
#[must_use]
pub fn now_timestamp() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

#[derive(Deserialize)]
struct StoredMessage {
    role: Role,
    content: MessageContent,
    #[serde(deserialize_with = "deserialize_timestamp")]
    timestamp: NaiveDateTime,
}

impl TryFrom<StoredMessage> for Message {
    type Error = ConversationError;

    fn try_from(stored: StoredMessage) -> Result<Self, Self::Error> {
        Self::new(stored.role, stored.content, stored.timestamp)
    }
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}
