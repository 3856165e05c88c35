//! # dia-report
//!
//! Turns persisted judge rows into one canonical [`DisplayDecision`].
//!
//! - Single judge: the decision and its scores, `ensemble_size == 1`.
//! - Ensemble: winner, margin, feedback, and reasoning from the stored
//!   ensemble summary, scores unioned across every judge, and the per-judge
//!   breakdown in `metadata.individual_decisions`.
//!
//! Reconciliation is read-only and deterministic: the same session id yields
//! the same output every time.

mod decision;
mod error;
mod participants;
mod reasoning;
mod reconciler;
mod scoring;
mod strength;

pub use decision::{DecisionMetadata, DisplayDecision, DisplayScore, IndividualDecision};
pub use error::ReportError;
pub use participants::ParticipantDirectory;
pub use reasoning::is_structured_reasoning;
pub use reconciler::ResultReconciler;
pub use scoring::{check_incomplete_scoring, incomplete_participants};
pub use strength::VictoryStrength;
