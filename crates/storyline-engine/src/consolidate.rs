use crate::extract;
use crate::graph::AgentGraph;
use chrono::Utc;
use std::collections::HashMap;
use storyline_core::{
    AgentId, AgentResult, ProjectContext, Provenance, Section, Storyline, StorylineStatus,
};

/// Presentation-layer estimate of delivery time per section, in seconds.
/// An estimate for rendering, not a measured value.
const SECTION_TIME_BUDGET_SECS: u64 = 90;

const MAX_KEY_POINTS: usize = 4;

/// Transform the per-agent results of a run into the final storyline.
///
/// Sections follow the canonical declared agent order, not completion
/// order. Never errors: a run with zero completed agents still yields a
/// valid (empty) report.
pub fn consolidate(
    graph: &AgentGraph,
    results: &HashMap<AgentId, AgentResult>,
    ctx: &ProjectContext,
) -> Storyline {
    let generated_at = Utc::now();
    let mut sections = Vec::new();

    for spec in graph.agents() {
        let Some(result) = results.get(&spec.id) else {
            continue;
        };
        let content = &result.content;
        sections.push(Section {
            id: format!("section-{}", spec.id),
            title: content
                .title
                .clone()
                .unwrap_or_else(|| format!("{} Analysis", spec.display_name)),
            order: sections.len() as u32 + 1,
            source_agent: spec.id.clone(),
            insights: content.insights.clone(),
            citations: content.citations.clone(),
            key_points: content.insights.iter().take(MAX_KEY_POINTS).cloned().collect(),
            chart_data: extract::structured(&content.body, extract::CHART_KEYS),
            generated_at,
        });
    }

    let live = results
        .values()
        .filter(|r| r.produced_by == Provenance::Live)
        .count();
    let status = if sections.is_empty() {
        StorylineStatus::Empty
    } else if live == graph.len() {
        StorylineStatus::Complete
    } else {
        StorylineStatus::Degraded
    };

    let project_name = if ctx.project_name.trim().is_empty() {
        "Project"
    } else {
        ctx.project_name.as_str()
    };
    let total_sections = sections.len();

    Storyline {
        title: format!("{project_name} Storyline"),
        summary: format!(
            "{total_sections} of {} analyses consolidated for {project_name}",
            graph.len()
        ),
        sections,
        total_sections,
        estimated_duration_secs: SECTION_TIME_BUDGET_SECS * total_sections as u64,
        generated_at,
        status,
    }
}
