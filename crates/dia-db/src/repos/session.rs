//! Session repository: save, list, load, delete.

use std::collections::BTreeMap;

use dia_core::entities::{LoadedSession, SessionListing, StoredSession, Transcript};
use dia_core::enums::DebatePhase;
use dia_core::ids::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::helpers::{
    from_json_text, get_opt_string, get_u32, get_u64, parse_datetime, parse_enum, to_json_text,
    to_sql_int,
};
use crate::{TranscriptStore, finish_transaction};

use super::message::{insert_messages, load_messages};

const SESSION_COLUMNS: &str = "id, topic, format, participants, context_metadata, final_phase, \
     total_rounds, message_count, word_count, saved_at, total_debate_time_ms, created_at";

/// Session-level context stored alongside the fixed columns.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContextMetadata {
    #[serde(default)]
    display_labels: BTreeMap<String, String>,
}

fn row_to_session(row: &libsql::Row) -> Result<StoredSession, DatabaseError> {
    let context: ContextMetadata = match get_opt_string(row, 4)? {
        Some(text) => from_json_text(&text)?,
        None => ContextMetadata::default(),
    };
    Ok(StoredSession {
        id: SessionId(row.get::<i64>(0)?),
        topic: row.get::<String>(1)?,
        format: parse_enum(&row.get::<String>(2)?)?,
        participants: from_json_text(&row.get::<String>(3)?)?,
        display_labels: context.display_labels,
        final_phase: DebatePhase::from(row.get::<String>(5)?),
        total_rounds: get_u32(row, 6)?,
        message_count: get_u32(row, 7)?,
        word_count: get_u32(row, 8)?,
        saved_at: parse_datetime(&row.get::<String>(9)?)?,
        total_debate_time_ms: get_u64(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn row_to_listing(row: &libsql::Row) -> Result<SessionListing, DatabaseError> {
    Ok(SessionListing {
        id: SessionId(row.get::<i64>(0)?),
        topic: row.get::<String>(1)?,
        format: parse_enum(&row.get::<String>(2)?)?,
        message_count: get_u32(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

/// Insert the session row and its messages.
pub(crate) async fn insert_session(
    conn: &libsql::Connection,
    transcript: &Transcript,
) -> Result<SessionId, DatabaseError> {
    let context = &transcript.context;
    let context_metadata = ContextMetadata {
        display_labels: context.display_labels.clone(),
    };

    conn.execute(
        "INSERT INTO sessions (topic, format, participants, context_metadata, final_phase, total_rounds, message_count, word_count, saved_at, total_debate_time_ms)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        libsql::params![
            context.topic.as_str(),
            context.format.as_str(),
            to_json_text(&context.participants)?,
            to_json_text(&context_metadata)?,
            transcript.final_phase.as_str(),
            i64::from(transcript.total_rounds()),
            i64::from(transcript.message_count()),
            i64::from(transcript.word_count()),
            transcript.saved_at.to_rfc3339(),
            to_sql_int(transcript.total_debate_time_ms),
        ],
    )
    .await?;
    let session_id = SessionId(conn.last_insert_rowid());

    insert_messages(conn, session_id, &transcript.messages).await?;
    Ok(session_id)
}

pub(crate) async fn session_exists(
    conn: &libsql::Connection,
    session_id: SessionId,
) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query("SELECT 1 FROM sessions WHERE id = ?1", [session_id.get()])
        .await?;
    Ok(rows.next().await?.is_some())
}

pub(crate) async fn load_session_row(
    conn: &libsql::Connection,
    session_id: SessionId,
) -> Result<StoredSession, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            [session_id.get()],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or(DatabaseError::SessionNotFound(session_id))?;
    row_to_session(&row)
}

impl TranscriptStore {
    /// Save a transcript (session row plus every message) in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any insert fails; nothing is written.
    pub async fn save_session(&self, transcript: &Transcript) -> Result<SessionId, DatabaseError> {
        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = insert_session(&tx, transcript).await;
        let session_id = finish_transaction(&conn, tx, outcome).await?;
        tracing::info!(%session_id, messages = transcript.messages.len(), "session saved");
        Ok(session_id)
    }

    /// Sessions newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_sessions(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<SessionListing>, DatabaseError> {
        let reader = self.reader().await?;
        let mut rows = reader
            .query(
                "SELECT id, topic, format, message_count, created_at
                 FROM sessions ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                libsql::params![i64::from(limit), i64::from(offset)],
            )
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_listing(&row)?);
        }
        Ok(sessions)
    }

    /// Load session metadata and its messages from one read snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if no such session exists.
    pub async fn load_session(&self, session_id: SessionId) -> Result<LoadedSession, DatabaseError> {
        let reader = self.reader().await?;
        let tx = reader.transaction().await?;
        let outcome = async {
            let session = load_session_row(&tx, session_id).await?;
            let messages = load_messages(&tx, session_id).await?;
            Ok::<_, DatabaseError>(LoadedSession { session, messages })
        }
        .await;
        finish_transaction(&reader, tx, outcome).await
    }

    /// Delete a session; messages, decisions, scores, and the ensemble
    /// summary cascade with it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if no such session exists.
    pub async fn delete_session(&self, session_id: SessionId) -> Result<(), DatabaseError> {
        let conn = self.writer().await;
        let tx = conn.transaction().await?;
        let outcome = async {
            let deleted = tx
                .execute("DELETE FROM sessions WHERE id = ?1", [session_id.get()])
                .await?;
            if deleted == 0 {
                return Err(DatabaseError::SessionNotFound(session_id));
            }
            Ok::<_, DatabaseError>(())
        }
        .await;
        finish_transaction(&conn, tx, outcome).await?;
        tracing::info!(%session_id, "session deleted");
        Ok(())
    }
}
