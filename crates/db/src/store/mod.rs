//! The record-store seam used by every flow.
//!
//! [`PgStore`] is the canonical backend. [`LocalStore`] keeps the three
//! collections in one JSON document on disk; it backs offline mode and is
//! the store integration tests run against.

mod local;
mod postgres;

use async_trait::async_trait;
use sitepulse_core::types::{DbId, Timestamp};

use crate::models::project::{CreateProject, Project};
use crate::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};
use crate::models::status_update::{CreateStatusUpdate, StatusUpdate};

pub use local::LocalStore;
pub use postgres::PgStore;

/// Errors from any [`RecordStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading or writing the local store file failed.
    #[error("Local store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The local store file is not a valid document.
    #[error("Local store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A record references a project that does not exist.
    #[error("Project {0} does not exist")]
    MissingProject(DbId),

    /// A uniqueness rule was violated.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Typed access to the `projects`, `projectAnalysis` and `statusUpdates`
/// collections. No operation spans more than one collection, and there are
/// no transactions across calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Confirm the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError>;

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;

    /// Projects newest first, optionally restricted to one owner.
    async fn list_projects(&self, owner_id: Option<&str>) -> Result<Vec<Project>, StoreError>;

    /// Increment the project's update counter and set its last-update time.
    async fn record_project_update(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Project>, StoreError>;

    async fn create_analysis(
        &self,
        input: &CreateProjectAnalysis,
    ) -> Result<ProjectAnalysis, StoreError>;

    async fn find_analysis(&self, project_id: DbId) -> Result<Option<ProjectAnalysis>, StoreError>;

    async fn create_status_update(
        &self,
        input: &CreateStatusUpdate,
    ) -> Result<StatusUpdate, StoreError>;

    /// Recorded turns for a project, oldest first.
    async fn list_status_updates(&self, project_id: DbId) -> Result<Vec<StatusUpdate>, StoreError>;
}
