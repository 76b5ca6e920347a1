//! Core types and error definitions for the Storyline engine.
//!
//! This crate provides the foundational types shared across all Storyline
//! crates: the error taxonomy, the project context supplied by callers,
//! per-agent result types, and the consolidated storyline report.
//!
//! # Main types
//!
//! - [`StorylineError`] — Fatal, structural errors (graph, config, serialization).
//! - [`CallError`] — Per-call failure taxonomy for one outbound agent invocation.
//! - [`ProjectContext`] — Flat input record for one run.
//! - [`AgentResult`] — The write-once result of one agent within a run.
//! - [`Storyline`] — The final consolidated report.

/// Project context supplied by the caller for one run.
pub mod context;
/// Error taxonomy.
pub mod error;
/// Per-agent identifiers, content, and results.
pub mod result;
/// Consolidated report types.
pub mod report;

pub use context::ProjectContext;
pub use error::{CallError, StorylineError, StorylineResult};
pub use report::{Section, Storyline, StorylineStatus};
pub use result::{AgentContent, AgentId, AgentResult, Provenance};
