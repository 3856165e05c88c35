//! Debate engine connection and timeout configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_handshake_timeout_secs() -> u64 {
    60
}

const fn default_idle_timeout_secs() -> u64 {
    90
}

const fn default_ping_interval_secs() -> u64 {
    30
}

const fn default_close_timeout_secs() -> u64 {
    10
}

const fn default_judge_timeout_secs() -> u64 {
    300
}

const fn default_http_timeout_local_secs() -> u64 {
    120
}

const fn default_http_timeout_remote_secs() -> u64 {
    30
}

const fn default_display_queue_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// HTTP base URL of the debate engine.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Event stream opening handshake.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,

    /// Longest silence tolerated on an open event stream.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Keepalive ping cadence.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Graceful close handshake.
    #[serde(default = "default_close_timeout_secs")]
    pub close_timeout_secs: u64,

    /// Per-judge evaluation budget.
    #[serde(default = "default_judge_timeout_secs")]
    pub judge_timeout_secs: u64,

    /// HTTP timeout when any debater runs on a local provider.
    #[serde(default = "default_http_timeout_local_secs")]
    pub http_timeout_local_secs: u64,

    #[serde(default = "default_http_timeout_remote_secs")]
    pub http_timeout_remote_secs: u64,

    /// Bounded queue between the orchestrator and the renderer.
    #[serde(default = "default_display_queue_capacity")]
    pub display_queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            close_timeout_secs: default_close_timeout_secs(),
            judge_timeout_secs: default_judge_timeout_secs(),
            http_timeout_local_secs: default_http_timeout_local_secs(),
            http_timeout_remote_secs: default_http_timeout_remote_secs(),
            display_queue_capacity: default_display_queue_capacity(),
        }
    }
}

impl EngineConfig {
    /// WebSocket base derived from the HTTP base (`http` → `ws`, `https` → `wss`).
    pub fn ws_base_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        }
    }

    pub const fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub const fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub const fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }

    pub const fn judge_timeout(&self) -> Duration {
        Duration::from_secs(self.judge_timeout_secs)
    }

    /// HTTP timeout for engine setup calls.
    pub const fn http_timeout(&self, uses_local_models: bool) -> Duration {
        if uses_local_models {
            Duration::from_secs(self.http_timeout_local_secs)
        } else {
            Duration::from_secs(self.http_timeout_remote_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = EngineConfig::default();
        assert_eq!(config.handshake_timeout(), Duration::from_secs(60));
        assert_eq!(config.ping_interval_secs, 30);
        assert_eq!(config.close_timeout_secs, 10);
        assert_eq!(config.display_queue_capacity, 64);
    }

    #[test]
    fn ws_base_follows_scheme() {
        let mut config = EngineConfig {
            base_url: "https://engine.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(config.ws_base_url(), "wss://engine.example.com");

        config.base_url = "http://localhost:8000".into();
        assert_eq!(config.ws_base_url(), "ws://localhost:8000");
    }

    #[test]
    fn local_models_get_longer_http_timeout() {
        let config = EngineConfig::default();
        assert_eq!(config.http_timeout(true), Duration::from_secs(120));
        assert_eq!(config.http_timeout(false), Duration::from_secs(30));
    }
}
