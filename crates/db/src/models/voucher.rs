//! Redemption voucher models.

use civitrack_core::status::StatusId;
use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `vouchers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Voucher {
    pub id: DbId,
    pub citizen_id: DbId,
    pub item_id: DbId,
    /// Globally unique redemption code.
    pub code: String,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub used_at: Option<Timestamp>,
}

/// Request body for `POST /vouchers/validate` (staff-side validation).
#[derive(Debug, Deserialize)]
pub struct ValidateVoucher {
    pub code: String,
}
