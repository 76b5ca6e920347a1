use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use storyline_core::{AgentId, StorylineError, StorylineResult};

/// Static configuration of one analysis agent.
///
/// The dependency graph is fixed and known at construction time; an agent's
/// phase is computed by [`AgentGraph`], never stored as configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent identifier.
    pub id: AgentId,
    /// Human-readable name, used for synthesized titles and placeholders.
    pub display_name: String,
    /// Short description shown to progress subscribers.
    pub description: String,
    /// Agents whose results this agent consumes.
    pub dependencies: Vec<AgentId>,
    /// Endpoint path segment the HTTP caller binds to.
    pub binding: String,
    /// Share of total run progress this agent contributes.
    pub weight: u32,
}

impl AgentSpec {
    /// Create a spec with no dependencies; the binding defaults to the id.
    pub fn new(id: impl Into<AgentId>, display_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            binding: id.as_str().to_string(),
            id,
            display_name: display_name.into(),
            description: String::new(),
            dependencies: Vec::new(),
            weight: 1,
        }
    }

    /// Set the progress-subscriber description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the dependency list.
    pub fn with_dependencies(mut self, deps: Vec<AgentId>) -> Self {
        self.dependencies = deps;
        self
    }

    /// Override the endpoint binding.
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = binding.into();
        self
    }

    /// Set the progress weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Immutable, validated agent dependency graph.
///
/// Declaration order is the canonical order: it decides section ordering in
/// the consolidated storyline regardless of completion order. Construction
/// validates the configuration up front — duplicate ids, dangling
/// dependencies, and cycles are hard errors rather than silent runtime
/// skips.
#[derive(Debug, Clone)]
pub struct AgentGraph {
    agents: Vec<AgentSpec>,
    index: HashMap<AgentId, usize>,
    phase: HashMap<AgentId, u32>,
    phases: Vec<Vec<AgentId>>,
}

impl AgentGraph {
    /// Validate the agent set and compute phase leveling.
    ///
    /// `phase(a) = 1` when `a` has no dependencies, otherwise
    /// `1 + max(phase(dep))`. An agent never depends on an agent in the
    /// same or a later phase.
    pub fn new(agents: Vec<AgentSpec>) -> StorylineResult<Self> {
        let mut index = HashMap::new();
        for (i, agent) in agents.iter().enumerate() {
            if index.insert(agent.id.clone(), i).is_some() {
                return Err(StorylineError::Graph(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
        }

        for agent in &agents {
            for dep in &agent.dependencies {
                if !index.contains_key(dep) {
                    return Err(StorylineError::Graph(format!(
                        "agent {} depends on unknown agent {}",
                        agent.id, dep
                    )));
                }
            }
        }

        let mut phase = HashMap::new();
        let mut visiting = HashSet::new();
        for agent in &agents {
            level(&agent.id, &agents, &index, &mut phase, &mut visiting)?;
        }

        let depth = phase.values().max().copied().unwrap_or(0);
        let mut phases = vec![Vec::new(); depth as usize];
        for agent in &agents {
            phases[(phase[&agent.id] - 1) as usize].push(agent.id.clone());
        }

        Ok(Self {
            agents,
            index,
            phase,
            phases,
        })
    }

    /// Look up an agent by id.
    pub fn get(&self, id: &AgentId) -> Option<&AgentSpec> {
        self.index.get(id).map(|&i| &self.agents[i])
    }

    /// The computed phase of an agent (1-based).
    pub fn phase_of(&self, id: &AgentId) -> Option<u32> {
        self.phase.get(id).copied()
    }

    /// Agent ids grouped by phase, in increasing phase order.
    /// Within a phase, ids keep declaration order.
    pub fn phases(&self) -> &[Vec<AgentId>] {
        &self.phases
    }

    /// All agents in canonical declared order.
    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// Sum of all agent weights.
    pub fn total_weight(&self) -> u64 {
        self.agents.iter().map(|a| u64::from(a.weight)).sum()
    }

    /// Number of agents in the graph.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True when the graph has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Memoized phase computation with cycle detection via the visiting set.
fn level(
    id: &AgentId,
    agents: &[AgentSpec],
    index: &HashMap<AgentId, usize>,
    phase: &mut HashMap<AgentId, u32>,
    visiting: &mut HashSet<AgentId>,
) -> StorylineResult<u32> {
    if let Some(&p) = phase.get(id) {
        return Ok(p);
    }
    if !visiting.insert(id.clone()) {
        return Err(StorylineError::Graph(format!(
            "dependency cycle through agent {id}"
        )));
    }

    let spec = &agents[index[id]];
    let mut p = 1;
    for dep in &spec.dependencies {
        p = p.max(1 + level(dep, agents, index, phase, visiting)?);
    }

    visiting.remove(id);
    phase.insert(id.clone(), p);
    Ok(p)
}
