use async_trait::async_trait;
use sitepulse_core::types::{DbId, Timestamp};

use super::{RecordStore, StoreError};
use crate::models::project::{CreateProject, Project};
use crate::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};
use crate::models::status_update::{CreateStatusUpdate, StatusUpdate};
use crate::repositories::{ProjectAnalysisRepo, ProjectRepo, StatusUpdateRepo};
use crate::DbPool;

/// [`RecordStore`] backed by PostgreSQL through the repository layer.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, StoreError> {
        Ok(ProjectRepo::create(&self.pool, input).await?)
    }

    async fn find_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, owner_id: Option<&str>) -> Result<Vec<Project>, StoreError> {
        let projects = match owner_id {
            Some(owner) => ProjectRepo::list_by_owner(&self.pool, owner).await?,
            None => ProjectRepo::list(&self.pool).await?,
        };
        Ok(projects)
    }

    async fn record_project_update(
        &self,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::record_update(&self.pool, id, at).await?)
    }

    async fn create_analysis(
        &self,
        input: &CreateProjectAnalysis,
    ) -> Result<ProjectAnalysis, StoreError> {
        Ok(ProjectAnalysisRepo::create(&self.pool, input).await?)
    }

    async fn find_analysis(&self, project_id: DbId) -> Result<Option<ProjectAnalysis>, StoreError> {
        Ok(ProjectAnalysisRepo::find_by_project(&self.pool, project_id).await?)
    }

    async fn create_status_update(
        &self,
        input: &CreateStatusUpdate,
    ) -> Result<StatusUpdate, StoreError> {
        Ok(StatusUpdateRepo::create(&self.pool, input).await?)
    }

    async fn list_status_updates(&self, project_id: DbId) -> Result<Vec<StatusUpdate>, StoreError> {
        Ok(StatusUpdateRepo::list_by_project(&self.pool, project_id).await?)
    }
}
