//! Debate setup: topic, format, and per-turn limits.

use dia_core::enums::DebateFormat;
use serde::{Deserialize, Serialize};

fn default_topic() -> String {
    "Should artificial intelligence be regulated?".to_string()
}

const fn default_format() -> DebateFormat {
    DebateFormat::Oxford
}

const fn default_word_limit() -> u32 {
    200
}

const fn default_time_per_turn() -> u32 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebateConfig {
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_format")]
    pub format: DebateFormat,

    /// Soft word limit per turn, passed to the engine.
    #[serde(default = "default_word_limit")]
    pub word_limit: u32,

    /// Seconds allowed per turn, passed to the engine.
    #[serde(default = "default_time_per_turn")]
    pub time_per_turn: u32,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            format: default_format(),
            word_limit: default_word_limit(),
            time_per_turn: default_time_per_turn(),
        }
    }
}
