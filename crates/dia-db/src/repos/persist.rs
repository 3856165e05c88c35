//! Single-commit persistence of a completed session.

use dia_core::entities::{CompletedSession, Judgment};
use dia_core::ids::{DecisionId, SessionId, SummaryId};

use crate::error::DatabaseError;
use crate::{TranscriptStore, finish_transaction};

use super::ensemble::insert_ensemble_summary;
use super::judge::{insert_criterion_scores, insert_judge_decision};
use super::session::insert_session;

/// Ids assigned by a successful [`TranscriptStore::persist_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub session_id: SessionId,
    /// In judgment order.
    pub decision_ids: Vec<DecisionId>,
    pub summary_id: Option<SummaryId>,
}

fn check_judgment(judgment: &Judgment) -> Result<(), DatabaseError> {
    for decision in judgment.decisions() {
        decision.validate()?;
    }
    if let Judgment::Ensemble { decisions, .. } = judgment {
        if decisions.len() < 2 {
            return Err(DatabaseError::InvalidState(format!(
                "ensemble judgment needs at least 2 decisions, got {}",
                decisions.len()
            )));
        }
    }
    Ok(())
}

async fn insert_completed(
    conn: &libsql::Connection,
    completed: &CompletedSession,
) -> Result<PersistedSession, DatabaseError> {
    let session_id = insert_session(conn, &completed.transcript).await?;

    let mut decision_ids = Vec::with_capacity(completed.judgment.decisions().len());
    for decision in completed.judgment.decisions() {
        let decision_id = insert_judge_decision(conn, session_id, decision).await?;
        insert_criterion_scores(conn, decision_id, &decision.criterion_scores).await?;
        decision_ids.push(decision_id);
    }

    let summary_id = match completed.judgment.summary() {
        Some(summary) => {
            Some(insert_ensemble_summary(conn, session_id, summary, &decision_ids).await?)
        }
        None => None,
    };

    Ok(PersistedSession {
        session_id,
        decision_ids,
        summary_id,
    })
}

impl TranscriptStore {
    /// Commit a completed session in one transaction: session, messages,
    /// judge decisions with their criterion scores, and the ensemble summary.
    ///
    /// Readers observe either all of it or none of it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if validation or any insert fails; the
    /// transaction is rolled back and nothing is written.
    pub async fn persist_session(
        &self,
        completed: &CompletedSession,
    ) -> Result<PersistedSession, DatabaseError> {
        check_judgment(&completed.judgment)?;

        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = insert_completed(&tx, completed).await;
        let persisted = finish_transaction(&conn, tx, outcome).await?;

        tracing::info!(
            session_id = %persisted.session_id,
            messages = completed.transcript.messages.len(),
            decisions = persisted.decision_ids.len(),
            ensemble = persisted.summary_id.is_some(),
            "session persisted"
        );
        Ok(persisted)
    }
}
