//! One recorded chat turn.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sitepulse_core::types::{DbId, Timestamp, UserId};

/// A row from the `status_updates` table. Append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: UserId,
    /// Raw text the contractor submitted.
    pub message: String,
    /// Text that was appended to the transcript in response (generated or fallback).
    pub reply: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateStatusUpdate {
    pub project_id: DbId,
    pub user_id: UserId,
    pub message: String,
    pub reply: String,
    pub created_at: Timestamp,
}
