//! Repository for the `status_updates` table.

use sqlx::PgPool;
use sitepulse_core::types::{new_id, DbId};

use crate::models::status_update::{CreateStatusUpdate, StatusUpdate};

const COLUMNS: &str = "id, project_id, user_id, message, reply, created_at";

/// Append-only access to recorded chat turns.
pub struct StatusUpdateRepo;

impl StatusUpdateRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateStatusUpdate,
    ) -> Result<StatusUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO status_updates (id, project_id, user_id, message, reply, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(new_id())
            .bind(input.project_id)
            .bind(&input.user_id)
            .bind(&input.message)
            .bind(&input.reply)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// All turns recorded for a project, oldest first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<StatusUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM status_updates WHERE project_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, StatusUpdate>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }
}
