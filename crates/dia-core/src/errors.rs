//! Cross-cutting error types for Dialectus.
//!
//! Domain-specific errors (`DatabaseError`, `StreamError`, `SessionError`, ...)
//! live in their respective crates. Everything converges on `anyhow` in
//! `dia-cli`.

use thiserror::Error;

/// Errors that can be raised by any Dialectus crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (format, range, required field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A timestamp string matched none of the accepted formats.
    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
