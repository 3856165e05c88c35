//! # dia-db
//!
//! Transcript store for Dialectus debate sessions on embedded libSQL.
//!
//! Holds sessions, messages, judge decisions, criterion scores, and ensemble
//! summaries with foreign-key integrity. Children cascade-delete with their
//! parent session, and criterion scores with their judge decision.
//!
//! ## Connection discipline
//!
//! - One writer connection behind an async mutex. Every write-path operation
//!   runs in a single transaction on it, so writers serialize.
//! - Reads open a fresh `query_only` connection per call. File databases run
//!   in WAL mode, so readers see the last committed snapshot and never block
//!   on, or are blocked by, an in-flight write.
//! - `":memory:"` databases cannot be shared across connections, so reads
//!   take the writer lock instead. Use a file path to exercise isolation.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

use std::ops::Deref;
use std::path::Path;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

const MEMORY_PATH: &str = ":memory:";

/// Handle to the transcript database.
///
/// Constructed explicitly at startup and passed by reference to the
/// orchestrator and reconciler. All repository methods live in
/// `impl TranscriptStore` blocks under [`repos`].
pub struct TranscriptStore {
    db: libsql::Database,
    writer: Mutex<libsql::Connection>,
    in_memory: bool,
}

/// A connection usable for reads.
pub(crate) enum Reader<'a> {
    Isolated(libsql::Connection),
    Shared(MutexGuard<'a, libsql::Connection>),
}

impl Deref for Reader<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Isolated(conn) => conn,
            Self::Shared(guard) => guard,
        }
    }
}

impl TranscriptStore {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let in_memory = path == MEMORY_PATH;
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        if !in_memory {
            // journal_mode returns the resulting mode as a row
            let mut rows = conn
                .query("PRAGMA journal_mode = WAL", ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
            let mode = match rows.next().await? {
                Some(row) => row.get::<String>(0)?,
                None => String::new(),
            };
            tracing::debug!(path, mode, "transcript store journal mode");
        }

        migrations::run_migrations(&conn).await?;
        tracing::debug!(path, "transcript store opened");

        Ok(Self {
            db,
            writer: Mutex::new(conn),
            in_memory,
        })
    }

    /// Open a database file, creating its parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created, the path is
    /// not valid UTF-8, or [`Self::open_local`] fails.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DatabaseError::Other(anyhow::anyhow!(
                    "create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let path_str = path.to_str().ok_or_else(|| {
            DatabaseError::InvalidState(format!("database path {} is not UTF-8", path.display()))
        })?;
        Self::open_local(path_str).await
    }

    /// Whether this store lives in memory (reads share the writer).
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Close the store. Outstanding reader connections stay valid until dropped.
    pub fn close(self) {
        tracing::debug!("transcript store closed");
        drop(self);
    }

    /// Acquire the writer connection. Holding the guard serializes writers.
    pub(crate) async fn writer(&self) -> MutexGuard<'_, libsql::Connection> {
        self.writer.lock().await
    }

    /// Acquire a connection for reads.
    pub(crate) async fn reader(&self) -> Result<Reader<'_>, DatabaseError> {
        if self.in_memory {
            return Ok(Reader::Shared(self.writer.lock().await));
        }
        let conn = self.db.connect()?;
        conn.execute("PRAGMA foreign_keys = ON", ()).await?;
        conn.execute("PRAGMA query_only = ON", ()).await?;
        Ok(Reader::Isolated(conn))
    }
}

/// Commit on success, roll back on failure, and propagate the original error.
pub(crate) async fn finish_transaction<T>(
    conn: &libsql::Connection,
    tx: libsql::Transaction,
    outcome: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match outcome {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(commit_error) => {
                // A failed COMMIT leaves the transaction open in SQLite
                if let Err(rollback_error) = conn.execute("ROLLBACK", ()).await {
                    tracing::debug!(%rollback_error, "no transaction left to roll back");
                }
                Err(commit_error.into())
            }
        },
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::warn!(%rollback_error, %error, "rollback failed after write error");
            }
            Err(error)
        }
    }
}
