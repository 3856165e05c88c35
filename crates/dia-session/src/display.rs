//! Fire-and-forget hand-off to a presentation task.
//!
//! The orchestrator never waits on rendering. When the queue is full the
//! event is dropped and counted, so a slow renderer cannot stall the stream
//! long enough to trip its idle timeout.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dia_core::entities::{JudgeDecision, Message};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// What the presentation task is told about.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Message(Message),
    JudgingStarted,
    Decision(JudgeDecision),
    Completed,
}

#[derive(Debug, Clone)]
pub struct DisplaySink {
    tx: mpsc::Sender<DisplayEvent>,
    dropped: Arc<AtomicU64>,
}

/// Bounded queue between the orchestrator and a presentation task.
#[must_use]
pub fn display_channel(capacity: usize) -> (DisplaySink, mpsc::Receiver<DisplayEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        DisplaySink {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}

impl DisplaySink {
    /// Enqueue without waiting. Returns whether the event was accepted.
    pub fn offer(&self, event: DisplayEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(dropped, "display queue full, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("display receiver gone");
                false
            }
        }
    }

    /// Events dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let (sink, mut rx) = display_channel(2);
        assert!(sink.offer(DisplayEvent::JudgingStarted));
        assert!(sink.offer(DisplayEvent::Completed));
        assert!(!sink.offer(DisplayEvent::Completed));
        assert_eq!(sink.dropped(), 1);

        assert_eq!(rx.recv().await, Some(DisplayEvent::JudgingStarted));
        assert!(sink.offer(DisplayEvent::Completed));
    }

    #[test]
    fn closed_receiver_is_not_counted_as_dropped() {
        let (sink, rx) = display_channel(1);
        drop(rx);
        assert!(!sink.offer(DisplayEvent::Completed));
        assert_eq!(sink.dropped(), 0);
    }
}
