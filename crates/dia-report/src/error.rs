use dia_core::ids::{DecisionId, SessionId};
use dia_db::error::DatabaseError;

/// Reconciliation failures.
///
/// Everything except `Database` means stored judge data is inconsistent
/// with a completed session, which points at a persistence bug.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("session {session_id} has {decisions} judge decisions but no ensemble summary")]
    MissingSummary {
        session_id: SessionId,
        decisions: usize,
    },

    #[error("ensemble summary of session {session_id} references missing decision {decision_id}")]
    MissingDecision {
        session_id: SessionId,
        decision_id: DecisionId,
    },

    #[error("session {session_id} expected {expected} judge decisions, found {found}")]
    MissingDecisions {
        session_id: SessionId,
        expected: usize,
        found: usize,
    },
}
