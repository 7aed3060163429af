//! Points ledger models.

use civitrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `points_ledger` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: DbId,
    pub citizen_id: DbId,
    /// Signed delta: positive for credits, negative for debits.
    pub amount: i64,
    pub reason: String,
    pub report_id: Option<DbId>,
    pub voucher_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Balance response payload for `GET /points/balance`.
#[derive(Debug, Serialize)]
pub struct Balance {
    pub citizen_id: DbId,
    pub balance: i64,
}
