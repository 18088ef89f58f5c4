//! Project-level rules: creation input, contractor links, dashboard search
//! and summary statistics.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::DbId;

/// Fields a project manager must supply to create a project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectDraft {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    /// Free text describing what good updates look like; used verbatim in prompts.
    #[validate(custom(function = "not_blank"))]
    pub tracking_focus_areas: String,
}

impl ProjectDraft {
    /// Trim every field and reject the draft if any of them ends up empty.
    pub fn normalized(self) -> Result<Self, CoreError> {
        let draft = Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            tracking_focus_areas: self.tracking_focus_areas.trim().to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Shareable chat entry point for a project: `{base_url}/chat/{id}`.
pub fn contractor_link(base_url: &str, project_id: DbId) -> String {
    format!("{}/chat/{project_id}", base_url.trim_end_matches('/'))
}

/// Case-insensitive substring match over name or description.
///
/// An empty (or whitespace-only) term matches everything.
pub fn matches_search(name: &str, description: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&term) || description.to_lowercase().contains(&term)
}

/// Summary numbers shown above the project list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_updates: i64,
    pub projects_with_updates: usize,
}

impl DashboardStats {
    /// Fold per-project update counters into dashboard totals.
    pub fn from_update_counts(counts: impl IntoIterator<Item = i64>) -> Self {
        counts
            .into_iter()
            .fold(Self::default(), |mut stats, count| {
                stats.total_projects += 1;
                stats.total_updates += count;
                if count > 0 {
                    stats.projects_with_updates += 1;
                }
                stats
            })
    }
}
