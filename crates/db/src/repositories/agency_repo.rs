//! Repository for the `agencies` table.

use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::agency::{Agency, CreateAgency};

/// Column list for `agencies` queries.
const COLUMNS: &str = "id, name, category, created_at, updated_at";

/// Provides CRUD operations for handling agencies.
pub struct AgencyRepo;

impl AgencyRepo {
    /// Insert a new agency.
    pub async fn create(pool: &PgPool, input: &CreateAgency) -> Result<Agency, sqlx::Error> {
        let query = format!(
            "INSERT INTO agencies (name, category) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agency>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .fetch_one(pool)
            .await
    }

    /// Find an agency by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies WHERE id = $1");
        sqlx::query_as::<_, Agency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all agencies, alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Agency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agencies ORDER BY name ASC");
        sqlx::query_as::<_, Agency>(&query).fetch_all(pool).await
    }

    /// How many of the given agency IDs exist. Used to validate a routing
    /// decision before creating assignments.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM agencies WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
