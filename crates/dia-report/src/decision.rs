use dia_core::ids::{DecisionId, SessionId};
use serde::Serialize;

use crate::strength::VictoryStrength;

/// One criterion score with its participant resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayScore {
    /// Canonical participant id (side labels are mapped back).
    pub participant_id: String,
    pub participant_name: String,
    pub criterion: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Judge that gave the score.
    pub judge_model: String,
}

/// One judge's verdict within an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualDecision {
    pub decision_id: DecisionId,
    pub judge_model: String,
    pub judge_provider: String,
    pub winner_id: String,
    pub winner_name: String,
    pub winner_margin: f64,
    pub victory_strength: Option<VictoryStrength>,
    pub overall_feedback: Option<String>,
    /// `None` when the judge returned structured data instead of prose.
    pub reasoning: Option<String>,
    pub criterion_scores: Vec<DisplayScore>,
    pub incomplete: bool,
    pub generation_time_ms: Option<u64>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecisionMetadata {
    /// Per-judge breakdown, in ensemble order. Empty for a single judge.
    pub individual_decisions: Vec<IndividualDecision>,
    pub judge_model: Option<String>,
    pub ensemble_method: Option<String>,
    pub consensus_level: Option<f64>,
}

/// The single decision shown for a session, whatever the judging mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayDecision {
    pub session_id: SessionId,
    pub winner_id: String,
    pub winner_name: String,
    pub winner_margin: f64,
    pub victory_strength: Option<VictoryStrength>,
    pub overall_feedback: Option<String>,
    pub reasoning: Option<String>,
    pub criterion_scores: Vec<DisplayScore>,
    pub ensemble_size: u32,
    /// Some participant has fewer scored criteria than configured.
    pub incomplete: bool,
    pub metadata: DecisionMetadata,
}

impl DisplayDecision {
    #[must_use]
    pub const fn is_ensemble(&self) -> bool {
        self.ensemble_size > 1
    }

    /// `"Judge: <model>"` or `"Ensemble Decision (<n> judges)"`.
    #[must_use]
    pub fn judge_summary(&self) -> String {
        if self.is_ensemble() {
            return format!("Ensemble Decision ({} judges)", self.ensemble_size);
        }
        match &self.metadata.judge_model {
            Some(model) => format!("Judge: {model}"),
            None => "AI Judge".to_string(),
        }
    }
}
