//! Repository for the `projects` table.

use sqlx::PgPool;
use sitepulse_core::types::{DbId, Timestamp};

use crate::models::project::{CreateProject, Project};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, description, tracking_focus_areas, \
     schedule_file_name, schedule_file_url, contractor_link, updates_count, \
     last_update, created_at";

/// Provides create/read operations and the update counter for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (id, owner_id, name, description, tracking_focus_areas,
                                   schedule_file_name, schedule_file_url, contractor_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.id)
            .bind(&input.owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.tracking_focus_areas)
            .bind(&input.schedule_file_name)
            .bind(&input.schedule_file_url)
            .bind(&input.contractor_link)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// List projects owned by one user, most recently created first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: &str) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE owner_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Bump `updates_count` by one and set `last_update`.
    ///
    /// The increment happens in a single statement so concurrent turns on the
    /// same project never lose a count. Returns `None` if the project is gone.
    pub async fn record_update(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                updates_count = updates_count + 1,
                last_update = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }
}
