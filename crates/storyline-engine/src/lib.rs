//! Agent orchestration engine for storyline generation.
//!
//! Executes a fixed set of analysis agents over a project context. Agents
//! form a dependency graph; the engine levels the graph into phases, runs
//! each phase (serially when one agent is ready, concurrently otherwise),
//! wraps every call in retry-with-fallback so a phase always completes,
//! tracks weighted progress, and consolidates the per-agent results into
//! one ordered storyline report.
//!
//! # Main types
//!
//! - [`Engine`] — Top-level orchestrator driving phase-by-phase execution.
//! - [`AgentGraph`] — Immutable, validated dependency graph with phase leveling.
//! - [`AgentCaller`] / [`HttpAgentCaller`] — The outbound transport seam.
//! - [`FallbackLibrary`] — Canned results substituted after retries exhaust.
//! - [`ProgressTracker`] — Weighted completion tracking with subscriber callbacks.
//! - [`EngineConfig`] — Environment-provided configuration with defaults.

/// The fixed production agent set.
pub mod agents;
/// Outbound agent transport.
pub mod caller;
/// Environment-backed engine configuration.
pub mod config;
/// Final report consolidation.
pub mod consolidate;
/// Orchestration engine and run state machine.
pub mod engine;
/// Declarative payload extractors.
pub mod extract;
/// Static fallback results.
pub mod fallback;
/// Agent specs and dependency graph leveling.
pub mod graph;
/// Outbound payload assembly.
pub mod input;
/// Weighted progress tracking.
pub mod progress;

pub use agents::default_agents;
pub use caller::{AgentCaller, HttpAgentCaller};
pub use config::EngineConfig;
pub use consolidate::consolidate;
pub use engine::{Engine, RetryPolicy, RunOutcome};
pub use fallback::FallbackLibrary;
pub use graph::{AgentGraph, AgentSpec};
pub use input::{build_input, AgentInput, DependencyDigest, ProjectBrief};
pub use progress::{AgentStatus, ProgressTracker, ProgressUpdate};
