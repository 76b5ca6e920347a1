use crate::graph::AgentSpec;
use storyline_core::AgentId;

/// The fixed production agent set.
///
/// Declaration order is the canonical storyline section order. Weights sum
/// to 100 so run progress lands on exactly 100 after the last agent.
///
/// Phases as computed by leveling: market/competitor/audience in phase 1,
/// trend-forecast and strategy in phase 2, storyline-synthesis in phase 3.
pub fn default_agents() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new("market-analysis", "Market Analysis")
            .with_description("Sizing the market and its growth drivers")
            .with_weight(15),
        AgentSpec::new("competitor-analysis", "Competitor Analysis")
            .with_description("Mapping the competitive landscape")
            .with_weight(15),
        AgentSpec::new("audience-insights", "Audience Insights")
            .with_description("Profiling the target audience")
            .with_weight(15),
        AgentSpec::new("trend-forecast", "Trend Forecast")
            .with_description("Projecting relevant market trends")
            .with_dependencies(vec![AgentId::from("market-analysis")])
            .with_weight(15),
        AgentSpec::new("strategy", "Strategic Recommendations")
            .with_description("Deriving strategic recommendations")
            .with_dependencies(vec![
                AgentId::from("market-analysis"),
                AgentId::from("competitor-analysis"),
                AgentId::from("audience-insights"),
            ])
            .with_weight(20),
        AgentSpec::new("storyline-synthesis", "Storyline Synthesis")
            .with_description("Weaving the analyses into one storyline")
            .with_dependencies(vec![
                AgentId::from("trend-forecast"),
                AgentId::from("strategy"),
            ])
            .with_weight(20),
    ]
}
