//! Message repository.

use dia_core::entities::{Message, StoredMessage};
use dia_core::enums::DebatePhase;
use dia_core::ids::SessionId;

use crate::TranscriptStore;
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, get_u32, metadata_from_text, metadata_to_text, parse_datetime, parse_enum,
    parse_optional_datetime,
};

const MESSAGE_COLUMNS: &str = "id, session_id, speaker_id, position, phase, round_number, content, \
     timestamp, word_count, metadata, cost, generation_id, cost_queried_at";

fn row_to_message(row: &libsql::Row) -> Result<StoredMessage, DatabaseError> {
    Ok(StoredMessage {
        id: row.get::<i64>(0)?,
        session_id: SessionId(row.get::<i64>(1)?),
        message: Message {
            speaker_id: row.get::<String>(2)?,
            position: parse_enum(&row.get::<String>(3)?)?,
            phase: DebatePhase::from(row.get::<String>(4)?),
            round_number: get_u32(row, 5)?,
            content: row.get::<String>(6)?,
            timestamp: parse_datetime(&row.get::<String>(7)?)?,
            word_count: get_u32(row, 8)?,
            metadata: metadata_from_text(get_opt_string(row, 9)?.as_deref())?,
            cost: row.get::<Option<f64>>(10)?,
            generation_id: get_opt_string(row, 11)?,
            cost_queried_at: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
        },
    })
}

/// Insert messages in slice order; row ids follow that order.
pub(crate) async fn insert_messages(
    conn: &libsql::Connection,
    session_id: SessionId,
    messages: &[Message],
) -> Result<(), DatabaseError> {
    for message in messages {
        conn.execute(
            "INSERT INTO messages (session_id, speaker_id, position, phase, round_number, content, timestamp, word_count, metadata, cost, generation_id, cost_queried_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            libsql::params![
                session_id.get(),
                message.speaker_id.as_str(),
                message.position.as_str(),
                message.phase.as_str(),
                i64::from(message.round_number),
                message.content.as_str(),
                message.timestamp.to_rfc3339(),
                i64::from(message.effective_word_count()),
                metadata_to_text(&message.metadata)?,
                message.cost,
                message.generation_id.as_deref(),
                message.cost_queried_at.map(|t| t.to_rfc3339()),
            ],
        )
        .await?;
    }
    Ok(())
}

/// Messages of a session in `(round_number, insertion order)`.
pub(crate) async fn load_messages(
    conn: &libsql::Connection,
    session_id: SessionId,
) -> Result<Vec<StoredMessage>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 ORDER BY round_number, id"
            ),
            [session_id.get()],
        )
        .await?;
    let mut messages = Vec::new();
    while let Some(row) = rows.next().await? {
        messages.push(row_to_message(&row)?);
    }
    Ok(messages)
}

impl TranscriptStore {
    /// Number of stored messages for a session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SessionNotFound` if the session does not exist.
    pub async fn count_messages(&self, session_id: SessionId) -> Result<u32, DatabaseError> {
        let reader = self.reader().await?;
        if !super::session::session_exists(&reader, session_id).await? {
            return Err(DatabaseError::SessionNotFound(session_id));
        }
        let mut rows = reader
            .query(
                "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                [session_id.get()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u32(&row, 0)
    }
}
