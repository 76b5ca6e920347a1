use serde::{Deserialize, Serialize};

/// Flat project context supplied by the caller for one run.
///
/// Every field is optional: missing fields deserialize to empty strings and
/// are substituted with sensible defaults by the input builder. A run never
/// fails because of an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectContext {
    /// Internal identifier of the project.
    pub project_id: String,
    /// Human-readable project name.
    pub project_name: String,
    /// Name of the client the project belongs to.
    pub client_name: String,
    /// Client industry.
    pub industry: String,
    /// Free-text project description.
    pub description: String,
    /// Identifier of the target deliverable.
    pub deliverable_id: String,
    /// Name of the target deliverable.
    pub deliverable_name: String,
    /// Free-text brief for the deliverable.
    pub brief: String,
    /// Geography the analysis should focus on.
    pub geography: String,
}
