use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{DecisionId, SessionId, SummaryId};

pub const DEFAULT_ENSEMBLE_METHOD: &str = "majority";

fn default_ensemble_method() -> String {
    DEFAULT_ENSEMBLE_METHOD.to_string()
}

/// Engine-computed combination of several judge decisions.
///
/// Winner and margin are taken as given; nothing here re-derives consensus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnsembleSummary {
    pub final_winner_id: String,
    pub final_margin: f64,
    #[serde(default = "default_ensemble_method")]
    pub ensemble_method: String,
    pub num_judges: u32,
    #[serde(default)]
    pub consensus_level: Option<f64>,
    #[serde(default)]
    pub summary_reasoning: Option<String>,
    #[serde(default)]
    pub summary_feedback: Option<String>,
}

/// An ensemble summary row read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StoredEnsembleSummary {
    pub id: SummaryId,
    pub session_id: SessionId,
    pub final_winner_id: String,
    pub final_margin: f64,
    pub ensemble_method: String,
    pub num_judges: u32,
    pub consensus_level: Option<f64>,
    pub summary_reasoning: Option<String>,
    pub summary_feedback: Option<String>,
    /// In the order the decisions were committed.
    pub participating_decision_ids: Vec<DecisionId>,
    pub created_at: DateTime<Utc>,
}
