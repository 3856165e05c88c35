//! Client for a debate engine reached over HTTP and WebSocket.
//!
//! Setup follows the engine's three-step protocol:
//! 1. `POST {base}/api/debates` creates the debate and returns its id.
//! 2. The event stream opens at `{ws-base}/ws/debate/{id}`.
//! 3. `POST {base}/api/debates/{id}/start` starts generation.
//!
//! The stream is opened before starting so no early event is missed.

use std::time::Duration;

use async_trait::async_trait;
use dia_config::DialectusConfig;
use dia_core::entities::{EnsembleSummary, JudgeDecision, Transcript};
use dia_stream::{EventSource, StreamTimeouts, WsEventStream};
use serde::Deserialize;

use crate::engine::{DebateEngine, EngineSession, JudgePanel, SessionRequest};
use crate::error::{EngineError, JudgingError};

/// Engine response to debate creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebateHandle {
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// HTTP half of the engine protocol.
#[derive(Debug, Clone)]
pub struct EngineApi {
    client: reqwest::Client,
    base_url: String,
}

impl EngineApi {
    /// # Errors
    ///
    /// Returns `EngineError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    ///
    /// Returns `EngineError` on transport failure, a non-success status, or
    /// a response without a debate id.
    pub async fn create_debate(
        &self,
        request: &SessionRequest,
    ) -> Result<DebateHandle, EngineError> {
        let endpoint = format!("{}/api/debates", self.base_url);
        let response = self.client.post(&endpoint).json(request).send().await?;
        let response = check_status(&endpoint, response).await?;
        let handle: DebateHandle = response.json().await?;
        if handle.id.trim().is_empty() {
            return Err(EngineError::Rejected(format!(
                "no debate id in response (status '{}')",
                handle.status
            )));
        }
        tracing::debug!(id = %handle.id, status = %handle.status, "debate created");
        Ok(handle)
    }

    /// # Errors
    ///
    /// Returns `EngineError` on transport failure or a non-success status.
    pub async fn start_debate(&self, debate_id: &str) -> Result<(), EngineError> {
        let endpoint = format!("{}/api/debates/{debate_id}/start", self.base_url);
        let response = self.client.post(&endpoint).send().await?;
        check_status(&endpoint, response).await?;
        Ok(())
    }
}

async fn check_status(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EngineError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// The remote engine judges in-stream, so a judge that never reported
/// cannot be asked again.
#[derive(Debug, Default)]
pub struct StreamJudges;

#[async_trait]
impl JudgePanel for StreamJudges {
    async fn evaluate(
        &self,
        judge_model: &str,
        _transcript: &Transcript,
    ) -> Result<JudgeDecision, JudgingError> {
        Err(JudgingError::Failed {
            judge: judge_model.to_string(),
            reason: "engine finished without a decision from this judge".into(),
        })
    }

    async fn summarize(
        &self,
        decisions: &[JudgeDecision],
    ) -> Result<EnsembleSummary, JudgingError> {
        Err(JudgingError::SummaryMissing {
            judges: decisions.len(),
        })
    }
}

/// [`DebateEngine`] backed by a remote engine.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    api: EngineApi,
    stream_base: String,
    timeouts: StreamTimeouts,
}

impl RemoteEngine {
    #[must_use]
    pub fn new(api: EngineApi, stream_base: impl Into<String>, timeouts: StreamTimeouts) -> Self {
        Self {
            api,
            stream_base: stream_base.into().trim_end_matches('/').to_string(),
            timeouts,
        }
    }

    /// Engine at `engine.base_url`, with the HTTP timeout chosen by whether
    /// any debater runs locally.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &DialectusConfig) -> Result<Self, EngineError> {
        let engine = &config.engine;
        let api = EngineApi::new(
            &engine.base_url,
            engine.http_timeout(config.uses_local_models()),
        )?;
        let timeouts = StreamTimeouts {
            handshake: engine.handshake_timeout(),
            idle: engine.idle_timeout(),
            ping_interval: engine.ping_interval(),
            close: engine.close_timeout(),
        };
        Ok(Self::new(api, engine.ws_base_url(), timeouts))
    }

    #[must_use]
    pub fn stream_url(&self, debate_id: &str) -> String {
        format!("{}/ws/debate/{debate_id}", self.stream_base)
    }
}

#[async_trait]
impl DebateEngine for RemoteEngine {
    async fn start(&self, request: &SessionRequest) -> Result<EngineSession, EngineError> {
        let handle = self.api.create_debate(request).await?;
        let mut events = WsEventStream::connect(&self.stream_url(&handle.id), self.timeouts).await?;

        if let Err(error) = self.api.start_debate(&handle.id).await {
            if let Err(close_error) = events.close().await {
                tracing::debug!(%close_error, "closing stream after failed start");
            }
            return Err(error);
        }

        Ok(EngineSession {
            debate_id: handle.id,
            context: request.context(),
            events: Box::new(events),
        })
    }

    fn judge_panel(&self) -> &dyn JudgePanel {
        &StreamJudges
    }
}
