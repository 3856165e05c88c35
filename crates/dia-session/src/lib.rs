//! # dia-session
//!
//! Drives one debate session end to end: engine setup, event consumption,
//! judging, and a single atomic commit to the transcript store.
//!
//! A session either commits everything (transcript, every judge decision
//! with its criterion scores, the ensemble summary) or nothing. Model and
//! judge error events, stream failures, any failed or timed-out judge when
//! judges are configured, and cancellation all end the session in
//! [`SessionState::Failed`] without touching the store.
//!
//! Rendering is decoupled through a bounded [`DisplaySink`]; the
//! orchestrator never waits on it.

mod display;
mod engine;
mod error;
mod judging;
mod orchestrator;
mod remote;
mod state;

pub use display::{DisplayEvent, DisplaySink, display_channel};
pub use engine::{DebateEngine, EngineSession, JudgePanel, SessionRequest};
pub use error::{EngineError, JudgingError, SessionError};
pub use judging::JudgingPlan;
pub use orchestrator::{Orchestrator, SessionOutcome};
pub use remote::{DebateHandle, EngineApi, RemoteEngine, StreamJudges};
pub use state::SessionState;
