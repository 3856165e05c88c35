//! In-process event source.
//!
//! The sending half accepts typed events or raw text frames. Raw frames go
//! through the same decoder as the WebSocket source.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::decode::accept_text;
use crate::error::StreamError;
use crate::event::DebateEvent;
use crate::source::EventSource;

#[derive(Debug)]
enum Inbound {
    Event(DebateEvent),
    Raw(String),
}

/// Create a bounded channel whose receiving half is an [`EventSource`].
#[must_use]
pub fn event_channel(capacity: usize, idle_timeout: Duration) -> (EventSender, ChannelEventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        EventSender { tx },
        ChannelEventStream {
            rx,
            idle_timeout,
            completed: false,
            closed: false,
        },
    )
}

/// Sending half of [`event_channel`].
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Inbound>,
}

impl EventSender {
    /// # Errors
    ///
    /// Returns `StreamError::Disconnected` if the stream was dropped or closed.
    pub async fn send(&self, event: DebateEvent) -> Result<(), StreamError> {
        self.tx
            .send(Inbound::Event(event))
            .await
            .map_err(|_| StreamError::Disconnected("event stream receiver dropped".into()))
    }

    /// Send an undecoded text frame.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Disconnected` if the stream was dropped or closed.
    pub async fn send_raw(&self, text: impl Into<String>) -> Result<(), StreamError> {
        self.tx
            .send(Inbound::Raw(text.into()))
            .await
            .map_err(|_| StreamError::Disconnected("event stream receiver dropped".into()))
    }
}

/// Receiving half of [`event_channel`].
#[derive(Debug)]
pub struct ChannelEventStream {
    rx: mpsc::Receiver<Inbound>,
    idle_timeout: Duration,
    completed: bool,
    closed: bool,
}

#[async_trait]
impl EventSource for ChannelEventStream {
    async fn next_event(&mut self) -> Result<Option<DebateEvent>, StreamError> {
        if self.completed {
            return Ok(None);
        }
        if self.closed {
            return Err(StreamError::Disconnected("event stream already closed".into()));
        }
        loop {
            let inbound = match tokio::time::timeout(self.idle_timeout, self.rx.recv()).await {
                Err(_) => return Err(StreamError::IdleTimeout(self.idle_timeout)),
                Ok(None) => {
                    self.closed = true;
                    return Err(StreamError::ClosedBeforeCompletion {
                        reason: Some("event sender dropped".into()),
                    });
                }
                Ok(Some(inbound)) => inbound,
            };
            let event = match inbound {
                Inbound::Event(event) => event,
                Inbound::Raw(text) => match accept_text(&text) {
                    Some(event) => event,
                    None => continue,
                },
            };
            if matches!(event, DebateEvent::DebateCompleted) {
                self.completed = true;
            }
            return Ok(Some(event));
        }
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        self.rx.close();
        Ok(())
    }
}
