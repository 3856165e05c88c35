//! Debater model configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider served by a local Ollama instance. Sessions that use it get the
/// longer HTTP timeout.
pub const LOCAL_PROVIDER: &str = "ollama";

fn default_provider() -> String {
    LOCAL_PROVIDER.to_string()
}

fn default_personality() -> String {
    "neutral".to_string()
}

const fn default_max_tokens() -> u32 {
    300
}

const fn default_temperature() -> f64 {
    0.7
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelConfig {
    /// Model name as the provider knows it, e.g. `qwen2.5:7b`.
    pub name: String,

    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_personality")]
    pub personality: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: default_provider(),
            personality: personality.into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.provider == LOCAL_PROVIDER
    }
}

/// Two local debaters so a fresh install can run without a config file.
pub(crate) fn default_models() -> BTreeMap<String, ModelConfig> {
    BTreeMap::from([
        (
            "model_a".to_string(),
            ModelConfig::new("qwen2.5:7b", "analytical"),
        ),
        (
            "model_b".to_string(),
            ModelConfig::new("llama3.2:3b", "passionate"),
        ),
    ])
}
