//! Row id newtypes.
//!
//! Ids are assigned by the transcript store (`INTEGER PRIMARY KEY`) and are
//! only meaningful after a successful commit. Keeping them as distinct types
//! prevents passing a judge decision id where a session id is expected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

row_id!(
    /// Id of a persisted debate session (`sessions.id`).
    SessionId
);
row_id!(
    /// Id of a persisted judge decision (`judge_decisions.id`).
    DecisionId
);
row_id!(
    /// Id of a persisted ensemble summary (`ensemble_summary.id`).
    SummaryId
);

/// Parse a comma-separated list of decision ids as stored in
/// `ensemble_summary.participating_judge_decision_ids`.
///
/// Blank segments are skipped so that `""` and `"1,,2"` are tolerated.
///
/// # Errors
///
/// Returns the offending segment if it is not an integer.
pub fn parse_decision_id_list(csv: &str) -> Result<Vec<DecisionId>, String> {
    csv.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<i64>()
                .map(DecisionId)
                .map_err(|_| segment.to_string())
        })
        .collect()
}

/// Inverse of [`parse_decision_id_list`].
#[must_use]
pub fn format_decision_id_list(ids: &[DecisionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
