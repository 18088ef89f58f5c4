//! Read-side project listings.

use serde::Serialize;
use sitepulse_core::project::{matches_search, DashboardStats};
use sitepulse_core::types::DbId;
use sitepulse_db::models::project::Project;
use sitepulse_db::models::status_update::StatusUpdate;
use sitepulse_db::{RecordStore, StoreError};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    pub projects: Vec<Project>,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    pub project: Project,
    pub has_schedule_analysis: bool,
    /// Oldest first.
    pub updates: Vec<StatusUpdate>,
}

/// Keep projects whose name or description contains `search`.
pub fn filter_projects(projects: Vec<Project>, search: Option<&str>) -> Vec<Project> {
    match search {
        Some(term) => projects
            .into_iter()
            .filter(|p| matches_search(&p.name, &p.description, term))
            .collect(),
        None => projects,
    }
}

/// The owner's projects, filtered. Stats cover all of the owner's projects,
/// not just the ones matching the search.
pub async fn manager_dashboard(
    store: &dyn RecordStore,
    owner_id: &str,
    search: Option<&str>,
) -> Result<ProjectListing, StoreError> {
    let projects = store.list_projects(Some(owner_id)).await?;
    let stats = DashboardStats::from_update_counts(projects.iter().map(|p| p.updates_count));
    Ok(ProjectListing {
        projects: filter_projects(projects, search),
        stats,
    })
}

/// Every project, newest first, filtered.
pub async fn contractor_projects(
    store: &dyn RecordStore,
    search: Option<&str>,
) -> Result<Vec<Project>, StoreError> {
    let projects = store.list_projects(None).await?;
    Ok(filter_projects(projects, search))
}

pub async fn project_details(
    store: &dyn RecordStore,
    project_id: DbId,
) -> Result<Option<ProjectDetails>, StoreError> {
    let Some(project) = store.find_project(project_id).await? else {
        return Ok(None);
    };
    let (analysis, updates) = futures::try_join!(
        store.find_analysis(project_id),
        store.list_status_updates(project_id),
    )?;
    Ok(Some(ProjectDetails {
        project,
        has_schedule_analysis: analysis.is_some(),
        updates,
    }))
}
