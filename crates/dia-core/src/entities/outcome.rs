use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ensemble::EnsembleSummary;
use super::judge::JudgeDecision;
use super::session::Transcript;

/// Judging results collected for one session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Judgment {
    /// No judges were configured.
    None,
    Single { decision: JudgeDecision },
    Ensemble {
        decisions: Vec<JudgeDecision>,
        summary: EnsembleSummary,
    },
}

impl Judgment {
    #[must_use]
    pub fn decisions(&self) -> &[JudgeDecision] {
        match self {
            Self::None => &[],
            Self::Single { decision } => std::slice::from_ref(decision),
            Self::Ensemble { decisions, .. } => decisions,
        }
    }

    #[must_use]
    pub const fn summary(&self) -> Option<&EnsembleSummary> {
        match self {
            Self::Ensemble { summary, .. } => Some(summary),
            _ => None,
        }
    }
}

/// Everything committed by a single atomic persist.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CompletedSession {
    pub transcript: Transcript,
    pub judgment: Judgment,
}
