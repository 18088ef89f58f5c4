//! Schedule analysis stored once per project.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sitepulse_core::types::{DbId, Timestamp};

/// A row from the `project_analysis` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub id: DbId,
    pub project_id: DbId,
    pub schedule_analysis: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateProjectAnalysis {
    pub project_id: DbId,
    pub schedule_analysis: String,
}
