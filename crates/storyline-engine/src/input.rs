use crate::graph::AgentSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use storyline_core::{AgentId, AgentResult, ProjectContext};

/// Typed outbound request payload for one agent call.
///
/// Built as structured data and serialized only at the transport boundary,
/// so validation and tests never deal in spliced strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInput {
    /// Binding of the agent being invoked.
    pub agent: String,
    /// Project context, with defaults substituted for empty fields.
    pub project: ProjectBrief,
    /// Digests of completed dependency results, keyed by agent id.
    /// Ordered map so serialized payloads are deterministic.
    pub dependencies: BTreeMap<String, DependencyDigest>,
}

/// Project fields forwarded to agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBrief {
    /// Project identifier.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Client name.
    pub client: String,
    /// Client industry.
    pub industry: String,
    /// Free-text project description.
    pub description: String,
    /// Target deliverable.
    pub deliverable: DeliverableBrief,
    /// Geography of interest.
    pub geography: String,
}

/// Deliverable fields forwarded to agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableBrief {
    /// Deliverable identifier.
    pub id: String,
    /// Deliverable name.
    pub name: String,
    /// Free-text brief.
    pub brief: String,
}

/// What a dependent agent sees of an upstream result.
///
/// Fallback results produce the same digest shape as live ones; dependents
/// never branch on provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyDigest {
    /// Upstream section title, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Upstream insights.
    pub insights: Vec<String>,
    /// Upstream citations.
    pub citations: Vec<Value>,
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Assemble the outbound payload for `spec` from the project context and the
/// already-completed results of its declared dependencies.
///
/// Pure function of its inputs: no I/O, no hidden state. Only the declared
/// dependencies present in `results` are folded in.
pub fn build_input(
    spec: &AgentSpec,
    ctx: &ProjectContext,
    results: &HashMap<AgentId, AgentResult>,
) -> AgentInput {
    let dependencies = spec
        .dependencies
        .iter()
        .filter_map(|dep| {
            results.get(dep).map(|r| {
                (
                    dep.to_string(),
                    DependencyDigest {
                        title: r.content.title.clone(),
                        insights: r.content.insights.clone(),
                        citations: r.content.citations.clone(),
                    },
                )
            })
        })
        .collect();

    AgentInput {
        agent: spec.binding.clone(),
        project: ProjectBrief {
            id: ctx.project_id.clone(),
            name: or_default(&ctx.project_name, "Untitled project"),
            client: or_default(&ctx.client_name, "Unnamed client"),
            industry: or_default(&ctx.industry, "General"),
            description: ctx.description.clone(),
            deliverable: DeliverableBrief {
                id: ctx.deliverable_id.clone(),
                name: or_default(&ctx.deliverable_name, "Deliverable"),
                brief: ctx.brief.clone(),
            },
            geography: or_default(&ctx.geography, "Global"),
        },
        dependencies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyline_core::AgentContent;

    fn result_with_insights(id: &str, insights: &[&str]) -> AgentResult {
        AgentResult::live(
            id.into(),
            AgentContent {
                insights: insights.iter().map(|s| s.to_string()).collect(),
                ..AgentContent::default()
            },
        )
    }

    #[test]
    fn includes_only_declared_dependencies() {
        let spec = AgentSpec::new("c", "C").with_dependencies(vec!["a".into()]);
        let mut results = HashMap::new();
        results.insert(AgentId::from("a"), result_with_insights("a", &["ia"]));
        results.insert(AgentId::from("b"), result_with_insights("b", &["ib"]));

        let input = build_input(&spec, &ProjectContext::default(), &results);
        assert_eq!(input.dependencies.len(), 1);
        assert_eq!(input.dependencies["a"].insights, vec!["ia"]);
    }

    #[test]
    fn missing_dependency_results_are_skipped_not_fatal() {
        let spec = AgentSpec::new("c", "C").with_dependencies(vec!["a".into(), "b".into()]);
        let mut results = HashMap::new();
        results.insert(AgentId::from("a"), result_with_insights("a", &["ia"]));

        let input = build_input(&spec, &ProjectContext::default(), &results);
        assert_eq!(input.dependencies.len(), 1);
    }

    #[test]
    fn fallback_results_get_no_special_casing() {
        let spec = AgentSpec::new("c", "C").with_dependencies(vec!["a".into()]);
        let mut results = HashMap::new();
        results.insert(
            AgentId::from("a"),
            AgentResult::fallback(
                "a".into(),
                AgentContent {
                    insights: vec!["canned insight".to_string()],
                    ..AgentContent::default()
                },
            ),
        );

        let input = build_input(&spec, &ProjectContext::default(), &results);
        assert_eq!(input.dependencies["a"].insights, vec!["canned insight"]);
    }

    #[test]
    fn empty_context_fields_get_defaults() {
        let spec = AgentSpec::new("a", "A");
        let input = build_input(&spec, &ProjectContext::default(), &HashMap::new());
        assert_eq!(input.project.name, "Untitled project");
        assert_eq!(input.project.industry, "General");
        assert_eq!(input.project.geography, "Global");
        assert_eq!(input.project.deliverable.name, "Deliverable");
    }

    #[test]
    fn populated_context_fields_pass_through() {
        let spec = AgentSpec::new("a", "A");
        let ctx = ProjectContext {
            project_name: "Atlas".to_string(),
            industry: "Retail".to_string(),
            geography: "EMEA".to_string(),
            ..ProjectContext::default()
        };
        let input = build_input(&spec, &ctx, &HashMap::new());
        assert_eq!(input.project.name, "Atlas");
        assert_eq!(input.project.industry, "Retail");
        assert_eq!(input.project.geography, "EMEA");
    }

    #[test]
    fn serializes_to_structured_json() {
        let spec = AgentSpec::new("c", "C").with_dependencies(vec!["a".into()]);
        let mut results = HashMap::new();
        results.insert(AgentId::from("a"), result_with_insights("a", &["ia"]));

        let input = build_input(&spec, &ProjectContext::default(), &results);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["agent"], "c");
        assert_eq!(json["dependencies"]["a"]["insights"][0], "ia");
    }
}
