//! # dia-core
//!
//! Core types, ids, and error types for Dialectus debate sessions.
//!
//! This crate provides the foundational types shared across all Dialectus crates:
//! - Entity structs for sessions, messages, judge decisions, criterion scores,
//!   and ensemble summaries (both the in-flight and the persisted shapes)
//! - Tag enums for participant positions, debate phases, and debate formats
//! - Integer id newtypes assigned by the transcript store
//! - The open key-value metadata map attached to messages and decisions
//! - Timestamp parsing shared by the event decoder and the store
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod metadata;
pub mod time;
