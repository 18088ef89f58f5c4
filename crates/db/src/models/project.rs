//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sitepulse_core::types::{DbId, Timestamp, UserId};

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub tracking_focus_areas: String,
    pub schedule_file_name: Option<String>,
    pub schedule_file_url: Option<String>,
    pub contractor_link: String,
    pub updates_count: i64,
    pub last_update: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a new project. The id is allocated by the caller so the
/// contractor link can embed it.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub id: DbId,
    pub owner_id: UserId,
    pub name: String,
    pub description: String,
    pub tracking_focus_areas: String,
    pub schedule_file_name: Option<String>,
    pub schedule_file_url: Option<String>,
    pub contractor_link: String,
}
