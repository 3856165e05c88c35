//! # dia-config
//!
//! Layered configuration loading for Dialectus using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DIALECTUS_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `./dialectus.toml`
//! 4. User-level `~/.config/dialectus/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DIALECTUS_ENGINE__IDLE_TIMEOUT_SECS` -> `engine.idle_timeout_secs`,
//! `DIALECTUS_JUDGING__JUDGE_PROVIDER` -> `judging.judge_provider`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use dia_config::DialectusConfig;
//!
//! let config = DialectusConfig::load_with_dotenv(None).expect("config");
//! config.validate().expect("valid config");
//!
//! if config.judging.is_ensemble() {
//!     println!("{} judges", config.judging.judge_models.len());
//! }
//! ```

mod debate;
mod engine;
mod error;
mod judging;
mod models;
mod storage;

pub use debate::DebateConfig;
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use judging::JudgingConfig;
pub use models::{LOCAL_PROVIDER, ModelConfig};
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DialectusConfig {
    #[serde(default)]
    pub debate: DebateConfig,
    #[serde(default = "models::default_models")]
    pub models: BTreeMap<String, ModelConfig>,
    #[serde(default)]
    pub judging: JudgingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for DialectusConfig {
    fn default() -> Self {
        Self {
            debate: DebateConfig::default(),
            models: models::default_models(),
            judging: JudgingConfig::default(),
            engine: EngineConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl DialectusConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or extract.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(explicit).extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("dialectus.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: --config file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("DIALECTUS_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dialectus").join("config.toml"))
    }

    /// Whether any debater runs on a local provider.
    pub fn uses_local_models(&self) -> bool {
        self.models.values().any(ModelConfig::is_local)
    }

    /// Reject configurations a session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field,
    /// or `ConfigError::NotConfigured` when judges have no provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debate.topic.trim().is_empty() {
            return Err(ConfigError::invalid("debate.topic", "must not be empty"));
        }
        if self.models.len() < 2 {
            return Err(ConfigError::invalid(
                "models",
                format!("a debate needs at least 2 models, found {}", self.models.len()),
            ));
        }
        if self.judging.is_configured()
            && self
                .judging
                .judge_provider
                .as_deref()
                .is_none_or(|p| p.trim().is_empty())
        {
            return Err(ConfigError::NotConfigured {
                section: "judging.judge_provider".into(),
            });
        }

        let engine = &self.engine;
        for (field, value) in [
            ("engine.handshake_timeout_secs", engine.handshake_timeout_secs),
            ("engine.idle_timeout_secs", engine.idle_timeout_secs),
            ("engine.ping_interval_secs", engine.ping_interval_secs),
            ("engine.close_timeout_secs", engine.close_timeout_secs),
            ("engine.judge_timeout_secs", engine.judge_timeout_secs),
            ("engine.http_timeout_local_secs", engine.http_timeout_local_secs),
            ("engine.http_timeout_remote_secs", engine.http_timeout_remote_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than zero"));
            }
        }
        if engine.display_queue_capacity == 0 {
            return Err(ConfigError::invalid(
                "engine.display_queue_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DialectusConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.uses_local_models());
        assert!(!config.judging.is_configured());
    }

    #[test]
    fn judges_without_provider_are_rejected() {
        let mut config = DialectusConfig::default();
        config.judging.judge_models = vec!["openthinker:7b".into()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotConfigured { .. })
        ));

        config.judging.judge_provider = Some("ollama".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = DialectusConfig::default();
        config.engine.idle_timeout_secs = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("engine.idle_timeout_secs"), "{err}");
    }

    #[test]
    fn empty_topic_is_rejected() {
        let mut config = DialectusConfig::default();
        config.debate.topic = "   ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn zero_display_capacity_is_rejected() {
        let mut config = DialectusConfig::default();
        config.engine.display_queue_capacity = 0;
        assert!(config.validate().is_err());
    }
}
