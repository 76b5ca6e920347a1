use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one analysis agent in the storyline graph.
///
/// A plain string newtype rather than a closed enum so that synthetic
/// agent sets can be constructed in tests and custom deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create an agent id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Whether a result came from a live agent call or the canned fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Produced by a successful call to the agent's endpoint.
    Live,
    /// Substituted from the static fallback library after retries were exhausted.
    Fallback,
}

/// Canonical, normalized payload of one agent response.
///
/// Whatever shape the endpoint answered with, normalization guarantees the
/// `insights` list is non-empty and `body` holds the task-specific content
/// object. Fallback content is structurally identical to live content, which
/// is what lets downstream agents consume either without branching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentContent {
    /// Section title proposed by the agent, if it supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Key findings. Never empty after normalization.
    #[serde(default)]
    pub insights: Vec<String>,
    /// Citations, each either a plain string or a structured object.
    #[serde(default)]
    pub citations: Vec<Value>,
    /// Confidence or quality score, if the agent reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Task-specific remainder of the payload, kept opaque.
    #[serde(default)]
    pub body: Value,
    /// Set when the response was missing required fields and was patched
    /// in place instead of being rejected.
    #[serde(default)]
    pub validation_warning: bool,
}

/// The write-once result of one agent within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// The agent that produced this result.
    pub agent_id: AgentId,
    /// Normalized response content.
    pub content: AgentContent,
    /// Live call or fallback substitution.
    pub produced_by: Provenance,
    /// When the result was recorded.
    pub completed_at: DateTime<Utc>,
}

impl AgentResult {
    /// A result produced by a successful live call.
    pub fn live(agent_id: AgentId, content: AgentContent) -> Self {
        Self {
            agent_id,
            content,
            produced_by: Provenance::Live,
            completed_at: Utc::now(),
        }
    }

    /// A result substituted from the fallback library.
    pub fn fallback(agent_id: AgentId, content: AgentContent) -> Self {
        Self {
            agent_id,
            content,
            produced_by: Provenance::Fallback,
            completed_at: Utc::now(),
        }
    }

    /// True when this result came from the fallback library.
    pub fn is_fallback(&self) -> bool {
        self.produced_by == Provenance::Fallback
    }
}
