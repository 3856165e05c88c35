use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CoreError;
use crate::ids::{DecisionId, SessionId};
use crate::metadata::Metadata;

/// One (participant, criterion) score within a judge decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CriterionScore {
    pub criterion: String,
    /// Participant id or side label, as the judge wrote it.
    pub participant_id: String,
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// One judge's verdict over a session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct JudgeDecision {
    pub judge_model: String,
    pub judge_provider: String,
    pub winner_id: String,
    pub winner_margin: f64,
    #[serde(default)]
    pub overall_feedback: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub generation_time_ms: Option<u64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub generation_id: Option<String>,
    #[serde(default)]
    pub cost_queried_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub criterion_scores: Vec<CriterionScore>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Side labels the judge was shown. Merged into the session context
    /// before commit rather than stored per decision.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub display_labels: BTreeMap<String, String>,
}

impl JudgeDecision {
    /// Check the invariants the store relies on.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty judge model or winner,
    /// a negative or non-finite margin, or a non-finite score.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.judge_model.trim().is_empty() {
            return Err(CoreError::Validation("judge_model is empty".into()));
        }
        if self.winner_id.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "judge '{}' produced an empty winner_id",
                self.judge_model
            )));
        }
        if !self.winner_margin.is_finite() || self.winner_margin < 0.0 {
            return Err(CoreError::Validation(format!(
                "judge '{}' produced invalid winner_margin {}",
                self.judge_model, self.winner_margin
            )));
        }
        if let Some(bad) = self.criterion_scores.iter().find(|s| !s.score.is_finite()) {
            return Err(CoreError::Validation(format!(
                "judge '{}' produced non-finite score for {}/{}",
                self.judge_model, bad.participant_id, bad.criterion
            )));
        }
        Ok(())
    }
}

/// A criterion score row read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoredCriterionScore {
    pub id: i64,
    pub judge_decision_id: DecisionId,
    #[serde(flatten)]
    pub score: CriterionScore,
}

/// A judge decision row with its criterion scores, read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoredJudgeDecision {
    pub id: DecisionId,
    pub session_id: SessionId,
    pub judge_model: String,
    pub judge_provider: String,
    pub winner_id: String,
    pub winner_margin: f64,
    pub overall_feedback: Option<String>,
    pub reasoning: Option<String>,
    pub generation_time_ms: Option<u64>,
    pub cost: Option<f64>,
    pub generation_id: Option<String>,
    pub cost_queried_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
    pub criterion_scores: Vec<StoredCriterionScore>,
    pub created_at: DateTime<Utc>,
}
