use serde::Serialize;
use std::time::Instant;
use storyline_core::AgentId;
use tokio::sync::RwLock;

/// Lifecycle status of one agent within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// The agent was dispatched.
    Starting,
    /// The agent's result was recorded (live or fallback).
    Completed,
    /// All live attempts were exhausted; fallback substitution follows.
    Failed,
}

/// Snapshot delivered to progress subscribers on every agent event.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    /// Phase the agent belongs to (1-based).
    pub phase: u32,
    /// Description of what the agent is doing.
    pub phase_description: String,
    /// The agent this event concerns.
    pub agent: AgentId,
    /// The event kind.
    pub status: AgentStatus,
    /// Weighted completion percentage, 0 to 100.
    pub progress: u64,
    /// Time since the run started.
    pub elapsed_ms: u64,
    /// Linear extrapolation of remaining time; `None` until any weight
    /// has been recorded.
    pub estimated_remaining_ms: Option<u64>,
}

type ProgressCallback = Box<dyn Fn(&ProgressUpdate) + Send + Sync>;

struct TrackerState {
    total_weight: u64,
    completed_weight: u64,
    started_at: Instant,
}

/// Weighted completion tracker.
///
/// Each agent carries a static weight; the tracker folds the weight in when
/// the agent completes (fallback completions included — the phase moved on
/// either way) and notifies every subscriber. Progress is monotonically
/// non-decreasing within a run and reaches exactly 100 only after the last
/// agent of the last phase is recorded complete.
pub struct ProgressTracker {
    state: RwLock<TrackerState>,
    subscribers: RwLock<Vec<ProgressCallback>>,
}

impl ProgressTracker {
    /// Create a tracker over the given total weight.
    pub fn new(total_weight: u64) -> Self {
        Self {
            state: RwLock::new(TrackerState {
                total_weight,
                completed_weight: 0,
                started_at: Instant::now(),
            }),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a callback invoked on every agent start/complete/fail event.
    /// Subscribers persist across runs.
    pub async fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&ProgressUpdate) + Send + Sync + 'static,
    {
        self.subscribers.write().await.push(Box::new(callback));
    }

    /// Reset per-run counters at the start of a run.
    pub async fn begin_run(&self) {
        let mut state = self.state.write().await;
        state.completed_weight = 0;
        state.started_at = Instant::now();
    }

    /// Current weighted completion percentage.
    pub async fn current_progress(&self) -> u64 {
        let state = self.state.read().await;
        percent(state.completed_weight, state.total_weight)
    }

    /// Record one agent event and notify subscribers.
    /// Weight is added only on [`AgentStatus::Completed`].
    pub async fn record(
        &self,
        phase: u32,
        phase_description: &str,
        agent: &AgentId,
        status: AgentStatus,
        weight: u64,
    ) {
        let update = {
            let mut state = self.state.write().await;
            if status == AgentStatus::Completed {
                state.completed_weight =
                    (state.completed_weight + weight).min(state.total_weight);
            }
            let progress = percent(state.completed_weight, state.total_weight);
            let elapsed_ms = state.started_at.elapsed().as_millis() as u64;
            let estimated_remaining_ms = if progress == 0 {
                None
            } else {
                // elapsed / (progress/100) − elapsed
                Some((elapsed_ms * 100 / progress).saturating_sub(elapsed_ms))
            };
            ProgressUpdate {
                phase,
                phase_description: phase_description.to_string(),
                agent: agent.clone(),
                status,
                progress,
                elapsed_ms,
                estimated_remaining_ms,
            }
        };

        let subscribers = self.subscribers.read().await;
        for callback in subscribers.iter() {
            callback(&update);
        }
    }
}

fn percent(completed: u64, total: u64) -> u64 {
    if total == 0 {
        100
    } else {
        completed * 100 / total
    }
}
