//! Ensemble summary repository.

use dia_core::entities::{EnsembleSummary, StoredEnsembleSummary};
use dia_core::ids::{
    DecisionId, SessionId, SummaryId, format_decision_id_list, parse_decision_id_list,
};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_u32, parse_datetime};
use crate::{TranscriptStore, finish_transaction};

use super::judge::decision_session;
use super::session::session_exists;

const SUMMARY_COLUMNS: &str = "id, session_id, final_winner_id, final_margin, ensemble_method, \
     num_judges, consensus_level, summary_reasoning, summary_feedback, \
     participating_judge_decision_ids, created_at";

fn row_to_summary(row: &libsql::Row) -> Result<StoredEnsembleSummary, DatabaseError> {
    let ids_csv = row.get::<String>(9)?;
    let participating_decision_ids = parse_decision_id_list(&ids_csv).map_err(|bad| {
        DatabaseError::Query(format!("invalid judge decision id '{bad}' in '{ids_csv}'"))
    })?;
    Ok(StoredEnsembleSummary {
        id: SummaryId(row.get::<i64>(0)?),
        session_id: SessionId(row.get::<i64>(1)?),
        final_winner_id: row.get::<String>(2)?,
        final_margin: row.get::<f64>(3)?,
        ensemble_method: row.get::<String>(4)?,
        num_judges: get_u32(row, 5)?,
        consensus_level: row.get::<Option<f64>>(6)?,
        summary_reasoning: get_opt_string(row, 7)?,
        summary_feedback: get_opt_string(row, 8)?,
        participating_decision_ids,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

/// Insert the summary after checking every referenced decision belongs to the
/// session and that the reported judge count matches them.
pub(crate) async fn insert_ensemble_summary(
    conn: &libsql::Connection,
    session_id: SessionId,
    summary: &EnsembleSummary,
    decision_ids: &[DecisionId],
) -> Result<SummaryId, DatabaseError> {
    if decision_ids.len() < 2 {
        return Err(DatabaseError::InvalidState(format!(
            "ensemble summary for session {session_id} needs at least 2 judge decisions, got {}",
            decision_ids.len()
        )));
    }
    if usize::try_from(summary.num_judges).ok() != Some(decision_ids.len()) {
        return Err(DatabaseError::InvalidState(format!(
            "ensemble summary reports {} judges but references {} decisions",
            summary.num_judges,
            decision_ids.len()
        )));
    }
    for &decision_id in decision_ids {
        let owner = decision_session(conn, decision_id).await?;
        if owner != session_id {
            return Err(DatabaseError::InvalidState(format!(
                "judge decision {decision_id} belongs to session {owner}, not {session_id}"
            )));
        }
    }

    conn.execute(
        "INSERT INTO ensemble_summary (session_id, final_winner_id, final_margin, ensemble_method, num_judges, consensus_level, summary_reasoning, summary_feedback, participating_judge_decision_ids)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        libsql::params![
            session_id.get(),
            summary.final_winner_id.as_str(),
            summary.final_margin,
            summary.ensemble_method.as_str(),
            i64::from(summary.num_judges),
            summary.consensus_level,
            summary.summary_reasoning.as_deref(),
            summary.summary_feedback.as_deref(),
            format_decision_id_list(decision_ids),
        ],
    )
    .await?;
    Ok(SummaryId(conn.last_insert_rowid()))
}

impl TranscriptStore {
    /// Save the ensemble summary for a session, referencing its decisions by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` or `JudgeDecisionNotFound` for
    /// dangling references, `InvalidState` for decisions of another session,
    /// or the constraint error if the session already has a summary.
    pub async fn save_ensemble_summary(
        &self,
        session_id: SessionId,
        summary: &EnsembleSummary,
        decision_ids: &[DecisionId],
    ) -> Result<SummaryId, DatabaseError> {
        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = async {
            if !session_exists(&tx, session_id).await? {
                return Err(DatabaseError::SessionNotFound(session_id));
            }
            insert_ensemble_summary(&tx, session_id, summary, decision_ids).await
        }
        .await;
        finish_transaction(&conn, tx, outcome).await
    }

    /// Load the ensemble summary of a session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if the session does not exist,
    /// or `DatabaseError::EnsembleSummaryNotFound` if it has no summary.
    pub async fn load_ensemble_summary(
        &self,
        session_id: SessionId,
    ) -> Result<StoredEnsembleSummary, DatabaseError> {
        let reader = self.reader().await?;
        let mut rows = reader
            .query(
                &format!("SELECT {SUMMARY_COLUMNS} FROM ensemble_summary WHERE session_id = ?1"),
                [session_id.get()],
            )
            .await?;
        if let Some(row) = rows.next().await? {
            return row_to_summary(&row);
        }
        if session_exists(&reader, session_id).await? {
            Err(DatabaseError::EnsembleSummaryNotFound(session_id))
        } else {
            Err(DatabaseError::SessionNotFound(session_id))
        }
    }
}
