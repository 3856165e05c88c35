use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{DebatePhase, Position};
use crate::ids::SessionId;
use crate::metadata::Metadata;

/// One utterance as received from the engine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Message {
    pub speaker_id: String,
    pub position: Position,
    pub phase: DebatePhase,
    pub round_number: u32,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub cost_queried_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Word count, falling back to counting the content when the engine
    /// did not supply one.
    #[must_use]
    pub fn effective_word_count(&self) -> u32 {
        if self.word_count > 0 {
            self.word_count
        } else {
            count_words(&self.content)
        }
    }
}

/// Whitespace-split word count.
#[must_use]
pub fn count_words(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// A message row read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub session_id: SessionId,
    #[serde(flatten)]
    pub message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whitespace_separated_words() {
        assert_eq!(count_words("  The motion\tfails\n badly "), 4);
        assert_eq!(count_words(""), 0);
    }
}
