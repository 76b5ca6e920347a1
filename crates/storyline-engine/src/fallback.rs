use crate::consolidate::consolidate;
use crate::graph::AgentGraph;
use serde_json::json;
use std::collections::HashMap;
use storyline_core::{
    AgentContent, AgentId, AgentResult, ProjectContext, Storyline, StorylineStatus,
};

/// Static, pre-validated substitute results.
///
/// Used when an agent's live call cannot succeed after retries — the sole
/// mechanism that guarantees a phase can always complete. Entries are
/// immutable once the library is built; the engine only reads them.
pub struct FallbackLibrary {
    entries: HashMap<AgentId, AgentContent>,
}

impl FallbackLibrary {
    /// An empty library. Unknown agents still get synthesized content.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Canned entries for the default agent set.
    pub fn with_defaults() -> Self {
        let mut lib = Self::new();
        lib.insert(
            "market-analysis",
            canned(
                "Market Analysis",
                &[
                    "Category demand has grown steadily over the last three years",
                    "Digital channels account for an increasing share of category spend",
                    "Mid-market segments remain underserved relative to premium tiers",
                ],
            ),
        );
        lib.insert(
            "competitor-analysis",
            canned(
                "Competitor Analysis",
                &[
                    "The category is led by two or three established players with broad reach",
                    "Challenger brands compete on speed and niche positioning",
                    "Price-led differentiation is eroding as offerings converge",
                ],
            ),
        );
        lib.insert(
            "audience-insights",
            canned(
                "Audience Insights",
                &[
                    "Decision makers weigh peer recommendations above advertising",
                    "Younger cohorts discover the category primarily through social channels",
                    "Trust and transparency rank among the top purchase drivers",
                ],
            ),
        );
        lib.insert(
            "trend-forecast",
            canned(
                "Trend Forecast",
                &[
                    "Personalization continues to shift from nice-to-have to expected",
                    "Sustainability claims increasingly require third-party substantiation",
                    "Short-form video remains the fastest-growing engagement format",
                ],
            ),
        );
        lib.insert(
            "strategy",
            canned(
                "Strategic Recommendations",
                &[
                    "Anchor the positioning on a single differentiated promise",
                    "Prioritize the channels where the audience already researches the category",
                    "Sequence the rollout to build proof points before scaling spend",
                ],
            ),
        );
        lib.insert(
            "storyline-synthesis",
            canned(
                "Storyline Synthesis",
                &[
                    "Open with the market opportunity, then the audience tension it creates",
                    "Position the recommendation as the resolution of that tension",
                    "Close with the expected outcomes and how they will be measured",
                ],
            ),
        );
        lib
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, id: impl Into<AgentId>, content: AgentContent) {
        self.entries.insert(id.into(), content);
    }

    /// Builder-style insert.
    pub fn with_entry(mut self, id: impl Into<AgentId>, content: AgentContent) -> Self {
        self.insert(id, content);
        self
    }

    /// The fallback content for an agent.
    ///
    /// Always returns something: agents without a canned entry get a
    /// synthesized generic one built from the display name.
    pub fn content_for(&self, id: &AgentId, display_name: &str) -> AgentContent {
        self.entries.get(id).cloned().unwrap_or_else(|| AgentContent {
            title: Some(format!("{display_name} Analysis")),
            insights: vec![format!(
                "{display_name} is based on standing guidance rather than a live analysis run"
            )],
            citations: Vec::new(),
            score: None,
            body: json!({}),
            validation_warning: false,
        })
    }

    /// The whole-run fallback storyline, returned when a fatal error occurs
    /// outside the per-agent retry/fallback machinery.
    pub fn storyline(&self, graph: &AgentGraph, ctx: &ProjectContext) -> Storyline {
        let results: HashMap<AgentId, AgentResult> = graph
            .agents()
            .iter()
            .map(|a| {
                (
                    a.id.clone(),
                    AgentResult::fallback(a.id.clone(), self.content_for(&a.id, &a.display_name)),
                )
            })
            .collect();

        let mut storyline = consolidate(graph, &results, ctx);
        storyline.status = StorylineStatus::Fallback;
        storyline
    }
}

impl Default for FallbackLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn canned(title: &str, insights: &[&str]) -> AgentContent {
    AgentContent {
        title: Some(title.to_string()),
        insights: insights.iter().map(|s| s.to_string()).collect(),
        citations: Vec::new(),
        score: None,
        body: json!({}),
        validation_warning: false,
    }
}
