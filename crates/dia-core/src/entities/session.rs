use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::enums::{DebateFormat, DebatePhase};
use crate::ids::SessionId;

use super::message::{Message, StoredMessage};

/// A configured debater, keyed by participant id in [`SessionContext`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ParticipantInfo {
    /// Model name, e.g. `qwen2.5:7b`.
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub personality: String,
}

/// Session-level facts fixed at setup, plus side labels learned from judges.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionContext {
    pub topic: String,
    pub format: DebateFormat,
    pub participants: BTreeMap<String, ParticipantInfo>,
    /// `participant_id → "Name - SideLabel"`.
    #[serde(default)]
    pub display_labels: BTreeMap<String, String>,
}

/// The in-memory transcript accumulated while streaming.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Transcript {
    pub context: SessionContext,
    pub messages: Vec<Message>,
    pub final_phase: DebatePhase,
    pub saved_at: DateTime<Utc>,
    pub total_debate_time_ms: u64,
}

impl Transcript {
    #[must_use]
    pub fn message_count(&self) -> u32 {
        u32::try_from(self.messages.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn word_count(&self) -> u32 {
        self.messages
            .iter()
            .map(Message::effective_word_count)
            .fold(0_u32, u32::saturating_add)
    }

    /// Highest round number seen, or 0 for an empty transcript.
    #[must_use]
    pub fn total_rounds(&self) -> u32 {
        self.messages
            .iter()
            .map(|m| m.round_number)
            .max()
            .unwrap_or(0)
    }
}

/// A session row read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoredSession {
    pub id: SessionId,
    pub topic: String,
    pub format: DebateFormat,
    pub participants: BTreeMap<String, ParticipantInfo>,
    pub display_labels: BTreeMap<String, String>,
    pub final_phase: DebatePhase,
    pub total_rounds: u32,
    pub message_count: u32,
    pub word_count: u32,
    pub saved_at: DateTime<Utc>,
    pub total_debate_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// One line of the paginated session listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionListing {
    pub id: SessionId,
    pub topic: String,
    pub format: DebateFormat,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
}

/// A full session: metadata plus messages in `(round_number, id)` order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LoadedSession {
    pub session: StoredSession,
    pub messages: Vec<StoredMessage>,
}
