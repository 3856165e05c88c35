//! Seams between the orchestrator and the debate engine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dia_config::{DialectusConfig, ModelConfig};
use dia_core::entities::{
    EnsembleSummary, JudgeDecision, ParticipantInfo, SessionContext, Transcript,
};
use dia_core::enums::DebateFormat;
use dia_stream::EventSource;
use serde::Serialize;

use crate::error::{EngineError, JudgingError};

/// Everything the engine needs to set up one debate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRequest {
    pub topic: String,
    pub format: DebateFormat,
    pub word_limit: u32,
    pub models: BTreeMap<String, ModelConfig>,
    pub judge_models: Vec<String>,
    /// Empty when no judges are configured.
    pub judge_provider: String,
}

impl SessionRequest {
    #[must_use]
    pub fn from_config(config: &DialectusConfig) -> Self {
        Self {
            topic: config.debate.topic.clone(),
            format: config.debate.format,
            word_limit: config.debate.word_limit,
            models: config.models.clone(),
            judge_models: config.judging.judge_models.clone(),
            judge_provider: config.judging.judge_provider.clone().unwrap_or_default(),
        }
    }

    /// Session context as known before any event arrives.
    #[must_use]
    pub fn context(&self) -> SessionContext {
        SessionContext {
            topic: self.topic.clone(),
            format: self.format,
            participants: self
                .models
                .iter()
                .map(|(id, model)| {
                    (
                        id.clone(),
                        ParticipantInfo {
                            name: model.name.clone(),
                            provider: model.provider.clone(),
                            personality: model.personality.clone(),
                        },
                    )
                })
                .collect(),
            display_labels: BTreeMap::new(),
        }
    }
}

/// A debate the engine has set up and started.
pub struct EngineSession {
    /// Engine-side identifier, not the transcript store id.
    pub debate_id: String,
    pub context: SessionContext,
    pub events: Box<dyn EventSource>,
}

/// Creates and starts debates.
#[async_trait]
pub trait DebateEngine: Send + Sync {
    /// Set up a debate and return its event stream.
    ///
    /// Nothing has been streamed when this fails.
    async fn start(&self, request: &SessionRequest) -> Result<EngineSession, EngineError>;

    /// Judges that evaluate transcripts for which the stream carried no decision.
    fn judge_panel(&self) -> &dyn JudgePanel;
}

/// Evaluates finished transcripts.
#[async_trait]
pub trait JudgePanel: Send + Sync {
    /// One judge's verdict. The orchestrator bounds this with the per-judge timeout.
    async fn evaluate(
        &self,
        judge_model: &str,
        transcript: &Transcript,
    ) -> Result<JudgeDecision, JudgingError>;

    /// Combine two or more decisions into the ensemble result.
    async fn summarize(&self, decisions: &[JudgeDecision]) -> Result<EnsembleSummary, JudgingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_default_config() {
        let config = DialectusConfig::default();
        let request = SessionRequest::from_config(&config);
        assert_eq!(request.format, DebateFormat::Oxford);
        assert!(request.judge_models.is_empty());
        assert_eq!(request.judge_provider, "");

        let context = request.context();
        assert_eq!(context.participants.len(), 2);
        assert_eq!(context.participants["model_a"].name, "qwen2.5:7b");
        assert_eq!(context.participants["model_b"].personality, "passionate");
    }

    #[test]
    fn request_serializes_for_the_engine() {
        let mut config = DialectusConfig::default();
        config.judging.judge_models = vec!["openthinker:7b".into()];
        config.judging.judge_provider = Some("ollama".into());
        let body = serde_json::to_value(SessionRequest::from_config(&config)).unwrap();
        assert_eq!(body["format"], "oxford");
        assert_eq!(body["judge_provider"], "ollama");
        assert_eq!(body["models"]["model_a"]["provider"], "ollama");
        assert_eq!(body["word_limit"], 200);
    }
}
