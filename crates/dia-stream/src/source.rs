use async_trait::async_trait;

use crate::error::StreamError;
use crate::event::DebateEvent;

/// A lazily consumed, non-restartable sequence of debate events.
///
/// `next_event` returns `Ok(None)` only after `debate_completed` has been
/// yielded. A stream that ends before that is an error.
#[async_trait]
pub trait EventSource: Send {
    /// Wait for the next event, bounded by the source's idle timeout.
    async fn next_event(&mut self) -> Result<Option<DebateEvent>, StreamError>;

    /// Release the underlying transport. Safe to call more than once.
    async fn close(&mut self) -> Result<(), StreamError>;
}
