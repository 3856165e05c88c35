//! WebSocket event source.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::decode::accept_text;
use crate::error::StreamError;
use crate::event::DebateEvent;
use crate::source::EventSource;

/// Timeouts governing one WebSocket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTimeouts {
    /// Bound on connection establishment.
    pub handshake: Duration,
    /// Bound on the gap between two consecutive frames.
    pub idle: Duration,
    /// Keepalive ping cadence.
    pub ping_interval: Duration,
    /// Bound on the close handshake.
    pub close: Duration,
}

impl Default for StreamTimeouts {
    fn default() -> Self {
        Self {
            handshake: Duration::from_secs(60),
            idle: Duration::from_secs(90),
            ping_interval: Duration::from_secs(30),
            close: Duration::from_secs(10),
        }
    }
}

/// Events read from the engine's `/ws/debate/{id}` socket.
pub struct WsEventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    timeouts: StreamTimeouts,
    ping: Interval,
    completed: bool,
    closed: bool,
}

impl WsEventStream {
    /// Open the socket within the handshake timeout.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::HandshakeTimeout` or `StreamError::Connect`.
    pub async fn connect(url: &str, timeouts: StreamTimeouts) -> Result<Self, StreamError> {
        tracing::debug!(url, "opening event stream");
        let handshake = tokio::time::timeout(timeouts.handshake, connect_async(url)).await;
        let (socket, _response) = match handshake {
            Err(_) => {
                return Err(StreamError::HandshakeTimeout {
                    url: url.to_string(),
                    timeout: timeouts.handshake,
                });
            }
            Ok(Err(e)) => {
                return Err(StreamError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Ok(Ok(pair)) => pair,
        };

        let mut ping = tokio::time::interval_at(
            Instant::now() + timeouts.ping_interval,
            timeouts.ping_interval,
        );
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(url, "event stream connected");
        Ok(Self {
            socket,
            timeouts,
            ping,
            completed: false,
            closed: false,
        })
    }

    fn end_of_stream(
        &mut self,
        reason: Option<String>,
    ) -> Result<Option<DebateEvent>, StreamError> {
        self.closed = true;
        if self.completed {
            Ok(None)
        } else {
            Err(StreamError::ClosedBeforeCompletion { reason })
        }
    }
}

#[async_trait]
impl EventSource for WsEventStream {
    async fn next_event(&mut self) -> Result<Option<DebateEvent>, StreamError> {
        if self.completed || self.closed {
            return if self.completed {
                Ok(None)
            } else {
                Err(StreamError::Disconnected("event stream already closed".into()))
            };
        }

        let idle = tokio::time::sleep(self.timeouts.idle);
        tokio::pin!(idle);

        loop {
            tokio::select! {
                () = &mut idle => {
                    tracing::warn!(timeout = ?self.timeouts.idle, "event stream idle");
                    return Err(StreamError::IdleTimeout(self.timeouts.idle));
                }
                _ = self.ping.tick() => {
                    if let Err(e) = self.socket.send(WsMessage::Ping(Vec::new())).await {
                        self.closed = true;
                        return Err(StreamError::Disconnected(e.to_string()));
                    }
                }
                frame = self.socket.next() => {
                    let frame = match frame {
                        None => {
                            self.closed = true;
                            return Err(StreamError::Disconnected(
                                "connection ended without a close frame".into(),
                            ));
                        }
                        Some(Err(e)) => {
                            self.closed = true;
                            return Err(StreamError::Disconnected(e.to_string()));
                        }
                        Some(Ok(frame)) => frame,
                    };
                    idle.as_mut().reset(Instant::now() + self.timeouts.idle);

                    match frame {
                        WsMessage::Text(text) => {
                            if let Some(event) = accept_text(&text) {
                                if matches!(event, DebateEvent::DebateCompleted) {
                                    self.completed = true;
                                }
                                return Ok(Some(event));
                            }
                        }
                        WsMessage::Close(close) => {
                            let reason = close.map(|c| c.reason.into_owned());
                            tracing::debug!(?reason, "close frame received");
                            return self.end_of_stream(reason);
                        }
                        WsMessage::Binary(bytes) => {
                            tracing::warn!(len = bytes.len(), "skipping binary frame");
                        }
                        WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
                    }
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let socket = &mut self.socket;
        let handshake = async {
            socket.close(None).await?;
            // Drain until the peer's close frame ends the stream
            while let Some(frame) = socket.next().await {
                frame?;
            }
            Ok::<_, WsError>(())
        };

        match tokio::time::timeout(self.timeouts.close, handshake).await {
            Err(_) => Err(StreamError::CloseTimeout(self.timeouts.close)),
            Ok(Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                tracing::debug!("event stream closed");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "event stream closed uncleanly");
                Ok(())
            }
        }
    }
}
