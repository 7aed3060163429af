//! Repository for the `reward_items` catalog table.
//!
//! Stock mutation happens only inside the redemption transaction
//! (`redemption_repo`); this repository covers catalog management.

use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::reward::{CreateRewardItem, RewardItem};

/// Column list for `reward_items` queries.
const COLUMNS: &str = "id, name, partner, description, cost_points, stock, created_at, updated_at";

/// Provides catalog operations for reward items.
pub struct RewardRepo;

impl RewardRepo {
    /// Insert a new catalog item.
    pub async fn create(pool: &PgPool, input: &CreateRewardItem) -> Result<RewardItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO reward_items (name, partner, description, cost_points, stock) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RewardItem>(&query)
            .bind(&input.name)
            .bind(&input.partner)
            .bind(&input.description)
            .bind(input.cost_points)
            .bind(input.stock)
            .fetch_one(pool)
            .await
    }

    /// Find a catalog item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RewardItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reward_items WHERE id = $1");
        sqlx::query_as::<_, RewardItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the catalog, in-stock items first.
    pub async fn list(pool: &PgPool) -> Result<Vec<RewardItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reward_items ORDER BY (stock > 0) DESC, name ASC"
        );
        sqlx::query_as::<_, RewardItem>(&query).fetch_all(pool).await
    }

    /// Restock an item (admin). Returns `None` when the item does not exist.
    pub async fn restock(
        pool: &PgPool,
        id: DbId,
        additional: i32,
    ) -> Result<Option<RewardItem>, sqlx::Error> {
        let query = format!(
            "UPDATE reward_items SET stock = stock + $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RewardItem>(&query)
            .bind(id)
            .bind(additional)
            .fetch_optional(pool)
            .await
    }
}
