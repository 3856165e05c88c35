//! # dia-stream
//!
//! The event channel for one debate session.
//!
//! An [`EventSource`] yields typed [`DebateEvent`]s lazily until the terminal
//! `debate_completed` event or a failure. Delivery is at-most-once: a source
//! is not restartable, and reconnecting starts a new logical stream.
//!
//! Two sources are provided:
//! - [`WsEventStream`] reads JSON text frames from the engine's WebSocket,
//!   enforcing separate handshake, idle, and close timeouts and sending
//!   keepalive pings.
//! - [`event_channel`] feeds events from inside the process, for engines
//!   that run in-process and for tests.
//!
//! Frames that fail to decode are logged and skipped. Unrecognized event
//! types are logged and ignored. Neither ends the stream.

mod channel;
mod decode;
mod error;
mod event;
mod source;
mod ws;

pub use channel::{ChannelEventStream, EventSender, event_channel};
pub use decode::{DecodeError, Frame, decode_frame};
pub use error::StreamError;
pub use event::{DebateEvent, ModelErrorDetail};
pub use source::EventSource;
pub use ws::{StreamTimeouts, WsEventStream};
