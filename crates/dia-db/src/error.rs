//! Database error types for dia-db.

use dia_core::errors::CoreError;
use dia_core::ids::{DecisionId, SessionId};
use thiserror::Error;

/// Errors from transcript store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// No session row with this id.
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    /// No judge decision row with this id.
    #[error("Judge decision {0} not found")]
    JudgeDecisionNotFound(DecisionId),

    /// The session exists but has no ensemble summary row.
    #[error("Ensemble summary for session {0} not found")]
    EnsembleSummaryNotFound(SessionId),

    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (bad input to a write, or bad data in the DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Domain validation rejected the input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether this is one of the three distinct not-found lookups.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_)
                | Self::JudgeDecisionNotFound(_)
                | Self::EnsembleSummaryNotFound(_)
        )
    }
}
