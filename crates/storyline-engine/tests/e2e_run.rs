//! End-to-end engine tests over a scripted mock caller.
//!
//! Verifies phase ordering, dependency flow into input payloads,
//! retry-then-fallback behaviour, progress monotonicity, and canonical
//! section ordering regardless of completion order.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyline_core::{AgentContent, AgentId, CallError, ProjectContext, Provenance, StorylineStatus};
use storyline_engine::{
    default_agents, AgentCaller, AgentGraph, AgentInput, AgentSpec, Engine, EngineConfig,
    ProgressUpdate, RetryPolicy,
};

// ---------------------------------------------------------------------------
// Mock caller — deterministic responses, scripted failures and delays
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockCaller {
    /// Agents whose calls always fail.
    fail: HashSet<AgentId>,
    /// Artificial latency per agent, to invert completion order in a phase.
    delays_ms: HashMap<AgentId, u64>,
    /// Attempt counts per agent.
    attempts: Mutex<HashMap<AgentId, u32>>,
    /// Every input payload the engine sent, in call order.
    inputs: Mutex<Vec<(AgentId, AgentInput)>>,
}

impl MockCaller {
    fn failing(ids: &[&str]) -> Self {
        Self {
            fail: ids.iter().map(|s| AgentId::from(*s)).collect(),
            ..Self::default()
        }
    }

    fn attempts_for(&self, id: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&AgentId::from(id))
            .copied()
            .unwrap_or(0)
    }

    fn inputs_for(&self, id: &str) -> Vec<AgentInput> {
        self.inputs
            .lock()
            .unwrap()
            .iter()
            .filter(|(agent, _)| agent.as_str() == id)
            .map(|(_, input)| input.clone())
            .collect()
    }
}

#[async_trait]
impl AgentCaller for MockCaller {
    async fn call(&self, spec: &AgentSpec, input: &AgentInput) -> Result<AgentContent, CallError> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(spec.id.clone())
            .or_insert(0) += 1;
        self.inputs
            .lock()
            .unwrap()
            .push((spec.id.clone(), input.clone()));

        if let Some(&delay) = self.delays_ms.get(&spec.id) {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail.contains(&spec.id) {
            return Err(CallError::Timeout);
        }

        Ok(AgentContent {
            title: Some(format!("{} Report", spec.display_name)),
            insights: vec![format!("insight from {}", spec.id)],
            citations: vec![serde_json::json!({"url": "https://example.com"})],
            score: Some(0.8),
            body: serde_json::json!({}),
            validation_warning: false,
        })
    }
}

fn instant_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay_ms: 0,
    }
}

fn engine_with(graph: AgentGraph, caller: Arc<MockCaller>) -> Engine {
    Engine::new(graph, caller, &EngineConfig::default()).with_retry_policy(instant_retries())
}

fn diamond_graph() -> AgentGraph {
    AgentGraph::new(vec![
        AgentSpec::new("a", "Alpha").with_weight(30),
        AgentSpec::new("b", "Beta").with_weight(30),
        AgentSpec::new("c", "Gamma")
            .with_dependencies(vec!["a".into(), "b".into()])
            .with_weight(40),
    ])
    .unwrap()
}

// ---------------------------------------------------------------------------
// Happy path over the default production graph
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_graph_happy_path() {
    let caller = Arc::new(MockCaller::default());
    let graph = AgentGraph::new(default_agents()).unwrap();
    let declared: Vec<AgentId> = graph.agents().iter().map(|a| a.id.clone()).collect();
    let engine = engine_with(graph, caller.clone());

    let outcome = engine.run(ProjectContext::default()).await;

    assert!(outcome.success);
    assert!(!outcome.fallback);
    assert_eq!(outcome.agent_results.len(), 6);
    assert_eq!(outcome.execution_order.len(), 6);
    assert_eq!(outcome.storyline.total_sections, 6);
    assert_eq!(outcome.storyline.status, StorylineStatus::Complete);

    // Sections follow declared order.
    let section_order: Vec<AgentId> = outcome
        .storyline
        .sections
        .iter()
        .map(|s| s.source_agent.clone())
        .collect();
    assert_eq!(section_order, declared);

    // Every agent was called exactly once.
    for agent in &declared {
        assert_eq!(caller.attempts_for(agent.as_str()), 1);
    }

    assert_eq!(engine.tracker().current_progress().await, 100);
}

// ---------------------------------------------------------------------------
// Dependency results are present before dependents' inputs are built
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dependents_receive_dependency_digests() {
    let caller = Arc::new(MockCaller::default());
    let engine = engine_with(diamond_graph(), caller.clone());

    let outcome = engine.run(ProjectContext::default()).await;
    assert!(outcome.success);

    let c_inputs = caller.inputs_for("c");
    assert_eq!(c_inputs.len(), 1);
    let deps = &c_inputs[0].dependencies;
    assert_eq!(deps.len(), 2);
    assert_eq!(deps["a"].insights, vec!["insight from a"]);
    assert_eq!(deps["b"].insights, vec!["insight from b"]);

    // C ran strictly after both phase-1 agents.
    assert_eq!(outcome.execution_order.last().map(AgentId::as_str), Some("c"));
}

// ---------------------------------------------------------------------------
// Retry exhaustion substitutes the fallback and the run proceeds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retries_exhaust_then_fallback_feeds_downstream() {
    let caller = Arc::new(MockCaller::failing(&["a"]));
    let engine = engine_with(diamond_graph(), caller.clone());

    let outcome = engine.run(ProjectContext::default()).await;

    // maxRetries = 2 → exactly 3 attempts.
    assert_eq!(caller.attempts_for("a"), 3);

    assert!(outcome.success, "per-agent failure must not fail the run");
    let a_result = &outcome.agent_results[&AgentId::from("a")];
    assert_eq!(a_result.produced_by, Provenance::Fallback);

    // Downstream C still executed, consuming the fallback digest.
    let c_inputs = caller.inputs_for("c");
    assert_eq!(c_inputs.len(), 1);
    let a_digest = &c_inputs[0].dependencies["a"];
    assert!(!a_digest.insights.is_empty());

    assert_eq!(outcome.storyline.status, StorylineStatus::Degraded);
    assert_eq!(outcome.storyline.total_sections, 3);
    assert_eq!(engine.tracker().current_progress().await, 100);
}

// ---------------------------------------------------------------------------
// Custom fallback entries are honored
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_fallback_entry_appears_in_storyline() {
    let caller = Arc::new(MockCaller::failing(&["a"]));
    let engine = engine_with(diamond_graph(), caller).with_fallbacks(
        storyline_engine::FallbackLibrary::new().with_entry(
            "a",
            AgentContent {
                title: Some("Canned Alpha".to_string()),
                insights: vec!["standing guidance".to_string()],
                ..AgentContent::default()
            },
        ),
    );

    let outcome = engine.run(ProjectContext::default()).await;
    let section = &outcome.storyline.sections[0];
    assert_eq!(section.title, "Canned Alpha");
    assert_eq!(section.key_points, vec!["standing guidance"]);
}

// ---------------------------------------------------------------------------
// Section order is declared order, not completion order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn section_order_ignores_completion_order() {
    let caller = Arc::new(MockCaller {
        delays_ms: [(AgentId::from("a"), 80), (AgentId::from("b"), 5)]
            .into_iter()
            .collect(),
        ..MockCaller::default()
    });
    let graph = AgentGraph::new(vec![
        AgentSpec::new("a", "Alpha").with_weight(50),
        AgentSpec::new("b", "Beta").with_weight(50),
    ])
    .unwrap();
    let engine = engine_with(graph, caller);

    let outcome = engine.run(ProjectContext::default()).await;

    // B finished first…
    assert_eq!(outcome.execution_order[0].as_str(), "b");
    // …but A's section still precedes B's.
    assert_eq!(outcome.storyline.sections[0].source_agent.as_str(), "a");
    assert_eq!(outcome.storyline.sections[1].source_agent.as_str(), "b");
}

// ---------------------------------------------------------------------------
// Progress subscription
// ---------------------------------------------------------------------------

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one_hundred() {
    let caller = Arc::new(MockCaller::default());
    let engine = engine_with(diamond_graph(), caller);

    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    engine
        .tracker()
        .subscribe(move |u| sink.lock().unwrap().push(u.clone()))
        .await;

    let outcome = engine.run(ProjectContext::default()).await;
    assert!(outcome.success);

    let updates = updates.lock().unwrap();
    // Start and complete events for each of the three agents.
    assert!(updates.len() >= 6, "expected >= 6 updates, got {}", updates.len());

    // First event fires before any weight landed: no estimate yet.
    assert_eq!(updates[0].progress, 0);
    assert_eq!(updates[0].estimated_remaining_ms, None);

    let progress: Vec<u64> = updates.iter().map(|u| u.progress).collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "progress regressed: {progress:?}");
    assert_eq!(*progress.last().unwrap(), 100);

    // Phase numbers are reported.
    assert!(updates.iter().any(|u| u.phase == 1));
    assert!(updates.iter().any(|u| u.phase == 2));
}

// ---------------------------------------------------------------------------
// Missing context never fails a run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_context_runs_with_defaults() {
    let caller = Arc::new(MockCaller::default());
    let engine = engine_with(diamond_graph(), caller.clone());

    let outcome = engine.run(ProjectContext::default()).await;
    assert!(outcome.success);
    assert_eq!(outcome.storyline.title, "Project Storyline");

    // Agents saw the substituted defaults rather than empty strings.
    let a_inputs = caller.inputs_for("a");
    assert_eq!(a_inputs[0].project.name, "Untitled project");
    assert_eq!(a_inputs[0].project.geography, "Global");
}

// ---------------------------------------------------------------------------
// Every agent failing still produces a full (degraded) storyline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn all_agents_failing_still_yields_full_report() {
    let caller = Arc::new(MockCaller::failing(&["a", "b", "c"]));
    let engine = engine_with(diamond_graph(), caller);

    let outcome = engine.run(ProjectContext::default()).await;

    assert!(outcome.success);
    assert_eq!(outcome.storyline.total_sections, 3);
    assert_eq!(outcome.storyline.status, StorylineStatus::Degraded);
    assert!(outcome
        .agent_results
        .values()
        .all(|r| r.produced_by == Provenance::Fallback));
}
