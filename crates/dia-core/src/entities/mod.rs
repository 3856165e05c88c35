//! Entity structs for all Dialectus domain objects.
//!
//! In-flight shapes (`Transcript`, `Message`, `JudgeDecision`, ...) are what the
//! orchestrator accumulates while a session streams. `Stored*` shapes are what
//! the transcript store hands back after commit, carrying row ids and
//! `created_at`. All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON output and schema validation.

mod ensemble;
mod judge;
mod message;
mod outcome;
mod session;

pub use ensemble::{DEFAULT_ENSEMBLE_METHOD, EnsembleSummary, StoredEnsembleSummary};
pub use judge::{CriterionScore, JudgeDecision, StoredCriterionScore, StoredJudgeDecision};
pub use message::{Message, StoredMessage, count_words};
pub use outcome::{CompletedSession, Judgment};
pub use session::{
    LoadedSession, ParticipantInfo, SessionContext, SessionListing, StoredSession, Transcript,
};
