//! Error types for session orchestration.

use std::time::Duration;

use dia_db::error::DatabaseError;
use dia_stream::{ModelErrorDetail, StreamError};
use thiserror::Error;

use crate::state::SessionState;

/// Failure to set up a session on the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("engine returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("engine rejected the debate: {0}")]
    Rejected(String),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Failure to collect the configured judgments.
#[derive(Debug, Error)]
pub enum JudgingError {
    #[error("judge {judge} did not finish within {timeout:?}")]
    Timeout { judge: String, timeout: Duration },

    #[error("judge {judge} failed: {reason}")]
    Failed { judge: String, reason: String },

    #[error("judge {judge} returned an invalid decision: {reason}")]
    Invalid { judge: String, reason: String },

    #[error("ensemble of {judges} judges produced no summary")]
    SummaryMissing { judges: usize },

    #[error("ensemble summary reports {reported} judges but {expected} are configured")]
    SummaryMismatch { reported: u32, expected: usize },
}

/// Why a session ended in [`SessionState::Failed`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session setup failed: {0}")]
    Init(#[source] EngineError),

    #[error("event stream failed: {0}")]
    Stream(#[from] StreamError),

    #[error("model error: {0}")]
    ModelError(ModelErrorDetail),

    #[error("judge error: {0}")]
    JudgeError(String),

    #[error("judging failed: {0}")]
    Judging(#[from] JudgingError),

    #[error("persisting session failed: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("session cancelled during {0}")]
    Cancelled(SessionState),

    #[error("message from {speaker_id} for round {round} arrived after round {previous}")]
    OutOfOrder {
        speaker_id: String,
        round: u32,
        previous: u32,
    },
}

impl SessionError {
    /// Whether the engine never produced a session (nothing was streamed).
    #[must_use]
    pub const fn produced_nothing(&self) -> bool {
        match self {
            Self::Init(_) | Self::Cancelled(SessionState::Initializing) => true,
            Self::Stream(stream) => stream.is_handshake_failure(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_failures_produce_nothing() {
        let err = SessionError::Init(EngineError::Rejected("bad topic".into()));
        assert!(err.produced_nothing());

        let err = SessionError::Stream(StreamError::IdleTimeout(Duration::from_secs(90)));
        assert!(!err.produced_nothing());

        assert!(!SessionError::Cancelled(SessionState::Streaming).produced_nothing());
    }

    #[test]
    fn model_error_surfaces_details() {
        let err = SessionError::ModelError(ModelErrorDetail {
            error: "generation failed".into(),
            model_name: Some("llama3.2:3b".into()),
            ..ModelErrorDetail::default()
        });
        assert_eq!(
            err.to_string(),
            "model error: generation failed (model llama3.2:3b)"
        );
    }
}
