use dia_core::entities::{EnsembleSummary, JudgeDecision, Message};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One event from the debate engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DebateEvent {
    /// A participant finished a turn.
    NewMessage(Message),
    /// Informational: the engine started judging.
    JudgingStarted,
    /// One judge's verdict. The final decision of an ensemble may carry the
    /// engine-computed ensemble summary.
    JudgeDecision {
        decision: JudgeDecision,
        ensemble_summary: Option<EnsembleSummary>,
    },
    /// A debater model failed. Fatal to the session.
    ModelError(ModelErrorDetail),
    /// A judge failed. Fatal to the session.
    JudgeError { error: String },
    /// Terminal success marker.
    DebateCompleted,
}

impl DebateEvent {
    /// Wire discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::JudgingStarted => "judging_started",
            Self::JudgeDecision { .. } => "judge_decision",
            Self::ModelError(_) => "model_error",
            Self::JudgeError { .. } => "judge_error",
            Self::DebateCompleted => "debate_completed",
        }
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelError(_) | Self::JudgeError { .. })
    }
}

/// Payload of a `model_error` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelErrorDetail {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub exception_type: Option<String>,
    #[serde(default)]
    pub exception_message: Option<String>,
}

impl fmt::Display for ModelErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = if self.error.is_empty() {
            "model failed"
        } else {
            &self.error
        };
        f.write_str(error)?;
        if let Some(model) = &self.model_name {
            write!(f, " (model {model}")?;
            if let Some(provider) = &self.provider {
                write!(f, " via {provider}")?;
            }
            f.write_str(")")?;
        }
        if let Some(speaker) = &self.speaker_id {
            write!(f, " speaker {speaker}")?;
        }
        if let Some(phase) = &self.phase {
            write!(f, " during {phase}")?;
        }
        match (&self.exception_type, &self.exception_message) {
            (Some(kind), Some(message)) => write!(f, ": {kind}: {message}"),
            (Some(kind), None) => write!(f, ": {kind}"),
            (None, Some(message)) => write!(f, ": {message}"),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display_includes_every_detail() {
        let detail = ModelErrorDetail {
            error: "Model generation failed".into(),
            speaker_id: Some("model_b".into()),
            model_name: Some("llama3.2:3b".into()),
            provider: Some("ollama".into()),
            phase: Some("rebuttal".into()),
            exception_type: Some("TimeoutError".into()),
            exception_message: Some("read timed out".into()),
        };
        assert_eq!(
            detail.to_string(),
            "Model generation failed (model llama3.2:3b via ollama) speaker model_b during rebuttal: TimeoutError: read timed out"
        );
    }

    #[test]
    fn model_error_display_with_no_detail() {
        assert_eq!(ModelErrorDetail::default().to_string(), "model failed");
    }

    #[test]
    fn only_error_events_are_fatal() {
        assert!(DebateEvent::JudgeError { error: "x".into() }.is_fatal());
        assert!(DebateEvent::ModelError(ModelErrorDetail::default()).is_fatal());
        assert!(!DebateEvent::JudgingStarted.is_fatal());
        assert!(!DebateEvent::DebateCompleted.is_fatal());
    }
}
