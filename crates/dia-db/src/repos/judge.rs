//! Judge decision and criterion score repository.

use dia_core::entities::{CriterionScore, JudgeDecision, StoredCriterionScore, StoredJudgeDecision};
use dia_core::ids::{DecisionId, SessionId};

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, get_opt_u64, metadata_from_text, metadata_to_text, parse_datetime,
    parse_optional_datetime, to_sql_int,
};
use crate::{TranscriptStore, finish_transaction};

use super::session::session_exists;

const DECISION_COLUMNS: &str = "id, session_id, judge_model, judge_provider, winner_id, winner_margin, \
     overall_feedback, reasoning, generation_time_ms, cost, generation_id, cost_queried_at, \
     metadata, created_at";

const SCORE_COLUMNS: &str = "id, judge_decision_id, criterion, participant_id, score, feedback";

fn row_to_decision(row: &libsql::Row) -> Result<StoredJudgeDecision, DatabaseError> {
    Ok(StoredJudgeDecision {
        id: DecisionId(row.get::<i64>(0)?),
        session_id: SessionId(row.get::<i64>(1)?),
        judge_model: row.get::<String>(2)?,
        judge_provider: row.get::<String>(3)?,
        winner_id: row.get::<String>(4)?,
        winner_margin: row.get::<f64>(5)?,
        overall_feedback: get_opt_string(row, 6)?,
        reasoning: get_opt_string(row, 7)?,
        generation_time_ms: get_opt_u64(row, 8)?,
        cost: row.get::<Option<f64>>(9)?,
        generation_id: get_opt_string(row, 10)?,
        cost_queried_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
        metadata: metadata_from_text(get_opt_string(row, 12)?.as_deref())?,
        criterion_scores: Vec::new(),
        created_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

fn row_to_score(row: &libsql::Row) -> Result<StoredCriterionScore, DatabaseError> {
    Ok(StoredCriterionScore {
        id: row.get::<i64>(0)?,
        judge_decision_id: DecisionId(row.get::<i64>(1)?),
        score: CriterionScore {
            criterion: row.get::<String>(2)?,
            participant_id: row.get::<String>(3)?,
            score: row.get::<f64>(4)?,
            feedback: get_opt_string(row, 5)?,
        },
    })
}

/// Insert the decision row only; scores go through [`insert_criterion_scores`].
pub(crate) async fn insert_judge_decision(
    conn: &libsql::Connection,
    session_id: SessionId,
    decision: &JudgeDecision,
) -> Result<DecisionId, DatabaseError> {
    decision.validate()?;
    conn.execute(
        "INSERT INTO judge_decisions (session_id, judge_model, judge_provider, winner_id, winner_margin, overall_feedback, reasoning, generation_time_ms, cost, generation_id, cost_queried_at, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        libsql::params![
            session_id.get(),
            decision.judge_model.as_str(),
            decision.judge_provider.as_str(),
            decision.winner_id.as_str(),
            decision.winner_margin,
            decision.overall_feedback.as_deref(),
            decision.reasoning.as_deref(),
            decision.generation_time_ms.map(to_sql_int),
            decision.cost,
            decision.generation_id.as_deref(),
            decision.cost_queried_at.map(|t| t.to_rfc3339()),
            metadata_to_text(&decision.metadata)?,
        ],
    )
    .await?;
    Ok(DecisionId(conn.last_insert_rowid()))
}

pub(crate) async fn insert_criterion_scores(
    conn: &libsql::Connection,
    decision_id: DecisionId,
    scores: &[CriterionScore],
) -> Result<(), DatabaseError> {
    for score in scores {
        conn.execute(
            "INSERT INTO criterion_scores (judge_decision_id, criterion, participant_id, score, feedback)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                decision_id.get(),
                score.criterion.as_str(),
                score.participant_id.as_str(),
                score.score,
                score.feedback.as_deref(),
            ],
        )
        .await?;
    }
    Ok(())
}

async fn load_scores(
    conn: &libsql::Connection,
    decision_id: DecisionId,
) -> Result<Vec<StoredCriterionScore>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SCORE_COLUMNS} FROM criterion_scores WHERE judge_decision_id = ?1 ORDER BY id"
            ),
            [decision_id.get()],
        )
        .await?;
    let mut scores = Vec::new();
    while let Some(row) = rows.next().await? {
        scores.push(row_to_score(&row)?);
    }
    Ok(scores)
}

pub(crate) async fn decision_session(
    conn: &libsql::Connection,
    decision_id: DecisionId,
) -> Result<SessionId, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT session_id FROM judge_decisions WHERE id = ?1",
            [decision_id.get()],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or(DatabaseError::JudgeDecisionNotFound(decision_id))?;
    Ok(SessionId(row.get::<i64>(0)?))
}

impl TranscriptStore {
    /// Save one judge decision row (without its criterion scores).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if the session does not exist,
    /// or `DatabaseError::Core` if the decision fails validation.
    pub async fn save_judge_decision(
        &self,
        session_id: SessionId,
        decision: &JudgeDecision,
    ) -> Result<DecisionId, DatabaseError> {
        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = async {
            if !session_exists(&tx, session_id).await? {
                return Err(DatabaseError::SessionNotFound(session_id));
            }
            insert_judge_decision(&tx, session_id, decision).await
        }
        .await;
        let decision_id = finish_transaction(&conn, tx, outcome).await?;
        tracing::debug!(%session_id, %decision_id, judge = %decision.judge_model, "judge decision saved");
        Ok(decision_id)
    }

    /// Save criterion scores for a decision, all or none.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::JudgeDecisionNotFound` if the decision does not
    /// exist, or the first failing insert; no score is written on error.
    pub async fn save_criterion_scores(
        &self,
        decision_id: DecisionId,
        scores: &[CriterionScore],
    ) -> Result<(), DatabaseError> {
        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = async {
            decision_session(&tx, decision_id).await?;
            insert_criterion_scores(&tx, decision_id, scores).await
        }
        .await;
        finish_transaction(&conn, tx, outcome).await
    }

    /// Load one judge decision with its criterion scores.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::JudgeDecisionNotFound` if no such decision exists.
    pub async fn load_judge_decision(
        &self,
        decision_id: DecisionId,
    ) -> Result<StoredJudgeDecision, DatabaseError> {
        let reader = self.reader().await?;
        let tx = reader.transaction().await?;
        let outcome = async {
            let mut rows = tx
                .query(
                    &format!("SELECT {DECISION_COLUMNS} FROM judge_decisions WHERE id = ?1"),
                    [decision_id.get()],
                )
                .await?;
            let row = rows
                .next()
                .await?
                .ok_or(DatabaseError::JudgeDecisionNotFound(decision_id))?;
            let mut decision = row_to_decision(&row)?;
            decision.criterion_scores = load_scores(&tx, decision_id).await?;
            Ok::<_, DatabaseError>(decision)
        }
        .await;
        finish_transaction(&reader, tx, outcome).await
    }

    /// Load every judge decision of a session in commit order.
    ///
    /// An existing session with no decisions yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if the session does not exist.
    pub async fn load_judge_decisions(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<StoredJudgeDecision>, DatabaseError> {
        let reader = self.reader().await?;
        let tx = reader.transaction().await?;
        let outcome = async {
            if !session_exists(&tx, session_id).await? {
                return Err(DatabaseError::SessionNotFound(session_id));
            }
            let mut rows = tx
                .query(
                    &format!(
                        "SELECT {DECISION_COLUMNS} FROM judge_decisions WHERE session_id = ?1 ORDER BY id"
                    ),
                    [session_id.get()],
                )
                .await?;
            let mut decisions = Vec::new();
            while let Some(row) = rows.next().await? {
                decisions.push(row_to_decision(&row)?);
            }
            for decision in &mut decisions {
                decision.criterion_scores = load_scores(&tx, decision.id).await?;
            }
            Ok(decisions)
        }
        .await;
        finish_transaction(&reader, tx, outcome).await
    }
}
