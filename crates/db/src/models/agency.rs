//! Handling agency models.

use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `agencies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Agency {
    pub id: DbId,
    pub name: String,
    /// Complaint category this agency handles (e.g. "roads", "sanitation").
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an agency via `POST /agencies`.
#[derive(Debug, Deserialize)]
pub struct CreateAgency {
    pub name: String,
    pub category: String,
}
