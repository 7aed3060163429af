//! Append-only execution records logged by field workers.

use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `execution_records` table. Never mutated or deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExecutionRecord {
    pub id: DbId,
    pub assignment_id: DbId,
    pub worker_id: DbId,
    pub action: String,
    pub photo_urls: Vec<String>,
    /// `progress` or `final`.
    pub kind: String,
    pub created_at: Timestamp,
}

/// Request body for `POST /assignments/{id}/executions`.
#[derive(Debug, Deserialize)]
pub struct LogExecution {
    pub action: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub kind: String,
}
