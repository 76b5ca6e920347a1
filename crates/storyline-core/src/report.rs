use crate::result::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One agent's contribution to the final consolidated storyline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Stable section identifier, derived from the source agent.
    pub id: String,
    /// Section title, drawn from the agent content or synthesized.
    pub title: String,
    /// 1-based position in the storyline (canonical declared order).
    pub order: u32,
    /// The agent that produced this section.
    pub source_agent: AgentId,
    /// All insights reported by the agent.
    pub insights: Vec<String>,
    /// Citations, string or structured.
    pub citations: Vec<Value>,
    /// Up to four leading insights for at-a-glance rendering.
    pub key_points: Vec<String>,
    /// Chart-shaped sub-structure extracted opportunistically from the
    /// content; absence is not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Value>,
    /// When the section was generated.
    pub generated_at: DateTime<Utc>,
}

/// Overall status of a consolidated storyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorylineStatus {
    /// Every declared agent contributed a live result.
    Complete,
    /// At least one section is missing or fallback-sourced.
    Degraded,
    /// Whole-run fallback after a fatal failure.
    Fallback,
    /// No agent produced a result.
    Empty,
}

/// The final consolidated report of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storyline {
    /// Report title.
    pub title: String,
    /// One-line summary of what was consolidated.
    pub summary: String,
    /// Sections in canonical declared agent order.
    pub sections: Vec<Section>,
    /// Number of sections.
    pub total_sections: usize,
    /// Presentation-layer estimate: fixed per-section time budget × count.
    pub estimated_duration_secs: u64,
    /// When the storyline was generated.
    pub generated_at: DateTime<Utc>,
    /// Overall status.
    pub status: StorylineStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StorylineStatus::Degraded).unwrap(), "\"degraded\"");
    }

    #[test]
    fn storyline_roundtrips_through_json() {
        let storyline = Storyline {
            title: "Atlas Storyline".to_string(),
            summary: "2 of 2 analyses consolidated".to_string(),
            sections: vec![Section {
                id: "section-market-analysis".to_string(),
                title: "Market Analysis".to_string(),
                order: 1,
                source_agent: "market-analysis".into(),
                insights: vec!["insight".to_string()],
                citations: Vec::new(),
                key_points: vec!["insight".to_string()],
                chart_data: None,
                generated_at: Utc::now(),
            }],
            total_sections: 1,
            estimated_duration_secs: 90,
            generated_at: Utc::now(),
            status: StorylineStatus::Complete,
        };
        let json = serde_json::to_string(&storyline).unwrap();
        let parsed: Storyline = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_sections, 1);
        assert_eq!(parsed.status, StorylineStatus::Complete);
        assert_eq!(parsed.sections[0].order, 1);
    }
}
