//! Repository for the `project_analysis` table.

use sqlx::PgPool;
use sitepulse_core::types::{new_id, DbId};

use crate::models::project_analysis::{CreateProjectAnalysis, ProjectAnalysis};

const COLUMNS: &str = "id, project_id, schedule_analysis, created_at";

pub struct ProjectAnalysisRepo;

impl ProjectAnalysisRepo {
    /// Insert the analysis for a project. A second insert for the same project
    /// violates `uq_project_analysis_project`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProjectAnalysis,
    ) -> Result<ProjectAnalysis, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_analysis (id, project_id, schedule_analysis)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectAnalysis>(&query)
            .bind(new_id())
            .bind(input.project_id)
            .bind(&input.schedule_analysis)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<ProjectAnalysis>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_analysis WHERE project_id = $1");
        sqlx::query_as::<_, ProjectAnalysis>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
