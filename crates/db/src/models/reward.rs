//! Reward catalog models.

use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reward_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RewardItem {
    pub id: DbId,
    pub name: String,
    pub partner: String,
    pub description: Option<String>,
    pub cost_points: i64,
    /// Remaining stock, never negative.
    pub stock: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a catalog item via `POST /rewards` (admin).
#[derive(Debug, Deserialize)]
pub struct CreateRewardItem {
    pub name: String,
    pub partner: String,
    pub description: Option<String>,
    pub cost_points: i64,
    pub stock: i32,
}
