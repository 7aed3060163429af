//! Repository for the append-only `points_ledger` table.
//!
//! Ledger entries are written inside the report-completion and redemption
//! transactions; this repository only reads.

use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::points::LedgerEntry;

/// Column list for `points_ledger` queries.
const COLUMNS: &str = "id, citizen_id, amount, reason, report_id, voucher_id, created_at";

/// Provides balance and history reads for the points ledger.
pub struct PointsRepo;

impl PointsRepo {
    /// A citizen's balance: the sum of all their signed ledger entries.
    pub async fn balance(pool: &PgPool, citizen_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM points_ledger WHERE citizen_id = $1",
        )
        .bind(citizen_id)
        .fetch_one(pool)
        .await
    }

    /// A citizen's ledger history, newest first.
    pub async fn list_for_citizen(
        pool: &PgPool,
        citizen_id: DbId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM points_ledger \
             WHERE citizen_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(citizen_id)
            .fetch_all(pool)
            .await
    }
}
