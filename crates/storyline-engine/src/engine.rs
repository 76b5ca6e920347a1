use crate::caller::AgentCaller;
use crate::config::EngineConfig;
use crate::consolidate::consolidate;
use crate::fallback::FallbackLibrary;
use crate::graph::{AgentGraph, AgentSpec};
use crate::input::{build_input, AgentInput};
use crate::progress::{AgentStatus, ProgressTracker};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storyline_core::{AgentId, AgentResult, ProjectContext, Storyline, StorylineResult};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Retry behaviour for one agent call before the fallback is substituted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Backoff grows linearly: attempt number × base delay.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1_000,
        }
    }
}

/// Outcome of one end-to-end run. Always carries a storyline: degraded or
/// wholly fallback-sourced rather than absent.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// False only when a fatal, structural failure aborted the run.
    pub success: bool,
    /// The consolidated report.
    pub storyline: Storyline,
    /// Agent ids in the order their results were recorded.
    pub execution_order: Vec<AgentId>,
    /// Wall-clock duration of the run.
    pub total_duration_ms: u64,
    /// Per-agent results keyed by agent id.
    pub agent_results: HashMap<AgentId, AgentResult>,
    /// Description of the fatal failure, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the storyline is the whole-run fallback.
    pub fallback: bool,
}

/// Per-run mutable state, owned exclusively by one `run` invocation and
/// destroyed when it returns. Results are write-once per agent id.
struct RunState {
    results: HashMap<AgentId, AgentResult>,
    execution_order: Vec<AgentId>,
}

/// The agent orchestration engine.
///
/// Drives phase-by-phase execution of the agent graph: agents in a phase
/// whose dependencies are satisfied run serially when alone and
/// concurrently otherwise, each wrapped in retry-with-fallback so that a
/// phase always completes. Results feed dependent agents' input payloads,
/// the progress tracker is notified on every agent event, and a final
/// consolidation pass builds the storyline.
pub struct Engine {
    graph: AgentGraph,
    caller: Arc<dyn AgentCaller>,
    fallbacks: FallbackLibrary,
    tracker: Arc<ProgressTracker>,
    retry: RetryPolicy,
}

impl Engine {
    /// Create an engine over a validated graph and a caller.
    pub fn new(graph: AgentGraph, caller: Arc<dyn AgentCaller>, config: &EngineConfig) -> Self {
        let tracker = Arc::new(ProgressTracker::new(graph.total_weight()));
        Self {
            graph,
            caller,
            fallbacks: FallbackLibrary::with_defaults(),
            tracker,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_delay_ms: config.retry_base_delay.as_millis() as u64,
            },
        }
    }

    /// Replace the fallback library.
    pub fn with_fallbacks(mut self, fallbacks: FallbackLibrary) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The progress tracker, for subscribing to run updates.
    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// The agent graph this engine runs.
    pub fn graph(&self) -> &AgentGraph {
        &self.graph
    }

    /// Run every phase of the graph and consolidate the storyline.
    ///
    /// Never fails: per-agent failures are absorbed by retry + fallback,
    /// and anything structural degrades to the whole-run fallback report
    /// with `success: false`.
    pub async fn run(&self, ctx: ProjectContext) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%run_id, project = %ctx.project_name, agents = self.graph.len(), "storyline run starting");
        self.tracker.begin_run().await;

        match self.run_inner(&ctx).await {
            Ok((storyline, state)) => {
                let total_duration_ms = started.elapsed().as_millis() as u64;
                info!(
                    %run_id,
                    sections = storyline.total_sections,
                    duration_ms = total_duration_ms,
                    "storyline run complete"
                );
                RunOutcome {
                    run_id,
                    success: true,
                    storyline,
                    execution_order: state.execution_order,
                    total_duration_ms,
                    agent_results: state.results,
                    error: None,
                    fallback: false,
                }
            }
            Err(e) => {
                error!(%run_id, error = %e, "storyline run failed, returning whole-run fallback");
                RunOutcome {
                    run_id,
                    success: false,
                    storyline: self.fallbacks.storyline(&self.graph, &ctx),
                    execution_order: Vec::new(),
                    total_duration_ms: started.elapsed().as_millis() as u64,
                    agent_results: HashMap::new(),
                    error: Some(e.to_string()),
                    fallback: true,
                }
            }
        }
    }

    async fn run_inner(&self, ctx: &ProjectContext) -> StorylineResult<(Storyline, RunState)> {
        let mut state = RunState {
            results: HashMap::new(),
            execution_order: Vec::new(),
        };

        for (idx, members) in self.graph.phases().iter().enumerate() {
            let phase = (idx + 1) as u32;

            // Leveling already guarantees dependencies resolve in earlier
            // phases; re-check defensively against the recorded results.
            let ready: Vec<&AgentSpec> = members
                .iter()
                .filter_map(|id| self.graph.get(id))
                .filter(|spec| {
                    spec.dependencies
                        .iter()
                        .all(|dep| state.results.contains_key(dep))
                })
                .collect();

            if ready.is_empty() {
                warn!(phase, "no ready agents in phase, skipping");
                continue;
            }

            info!(phase, agents = ready.len(), "phase starting");

            let settled: Vec<AgentResult> = if ready.len() == 1 {
                let spec = ready[0];
                let input = build_input(spec, ctx, &state.results);
                vec![self.execute_with_fallback(spec, input, phase).await]
            } else {
                // Inputs are built up front against the pre-phase snapshot,
                // then all calls go out concurrently. Results are collected
                // as they settle, so execution order reflects completion
                // order within the phase.
                let dispatches: Vec<(&AgentSpec, AgentInput)> = ready
                    .iter()
                    .map(|&spec| (spec, build_input(spec, ctx, &state.results)))
                    .collect();
                let mut pending: FuturesUnordered<_> = dispatches
                    .into_iter()
                    .map(|(spec, input)| self.execute_with_fallback(spec, input, phase))
                    .collect();
                let mut settled = Vec::with_capacity(pending.len());
                while let Some(result) = pending.next().await {
                    settled.push(result);
                }
                settled
            };

            for result in settled {
                // Write-once per agent id per run.
                if state.results.contains_key(&result.agent_id) {
                    continue;
                }
                state.execution_order.push(result.agent_id.clone());
                state.results.insert(result.agent_id.clone(), result);
            }
        }

        let storyline = consolidate(&self.graph, &state.results, ctx);
        Ok((storyline, state))
    }

    /// The only call path from the engine into the caller.
    ///
    /// Never fails: retries with linear backoff, then substitutes the
    /// canned fallback tagged `Provenance::Fallback`.
    async fn execute_with_fallback(
        &self,
        spec: &AgentSpec,
        input: AgentInput,
        phase: u32,
    ) -> AgentResult {
        let weight = u64::from(spec.weight);
        self.tracker
            .record(phase, &spec.description, &spec.id, AgentStatus::Starting, weight)
            .await;

        for attempt in 0..=self.retry.max_retries {
            match self.caller.call(spec, &input).await {
                Ok(content) => {
                    if content.validation_warning {
                        warn!(agent = %spec.id, "agent completed with patched output");
                    }
                    let result = AgentResult::live(spec.id.clone(), content);
                    self.tracker
                        .record(phase, &spec.description, &spec.id, AgentStatus::Completed, weight)
                        .await;
                    return result;
                }
                Err(e) => {
                    warn!(agent = %spec.id, attempt, error = %e, "agent call failed");
                    if attempt < self.retry.max_retries {
                        let delay = self.retry.base_delay_ms * u64::from(attempt + 1);
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }
                }
            }
        }

        self.tracker
            .record(phase, &spec.description, &spec.id, AgentStatus::Failed, weight)
            .await;
        info!(agent = %spec.id, "retries exhausted, substituting fallback content");
        let content = self.fallbacks.content_for(&spec.id, &spec.display_name);
        let result = AgentResult::fallback(spec.id.clone(), content);
        self.tracker
            .record(phase, &spec.description, &spec.id, AgentStatus::Completed, weight)
            .await;
        result
    }
}
