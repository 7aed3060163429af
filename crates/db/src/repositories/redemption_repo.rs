//! The redemption engine: exactly-once, stock-safe exchange of points for a
//! finite-stock reward.
//!
//! `redeem` runs as one transaction. The citizen row and the reward item row
//! are locked up front, so concurrent redemptions serialize: for an item
//! with stock 1, exactly one caller gets the voucher and the loser gets
//! `OutOfStock`, never a negative stock. The four writes (stock decrement,
//! voucher insert, ledger debit, and implicitly the balance check they rest
//! on) commit or roll back as a unit.

use civitrack_core::redemption::{
    generate_code, RedemptionError, VoucherValidationError,
};
use civitrack_core::status::VoucherStatus;
use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::voucher::Voucher;

/// Column list for `vouchers` queries.
const COLUMNS: &str = "id, citizen_id, item_id, code, status_id, created_at, used_at";

/// Attempts at generating a unique code before giving up. Collisions are
/// vanishingly rare; more than one retry showing up in logs means the code
/// space is too small for the voucher volume.
const MAX_CODE_ATTEMPTS: u32 = 5;

/// Failure modes of `Redeem`.
#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    /// Expected policy outcome; no mutation was made.
    #[error(transparent)]
    Policy(#[from] RedemptionError),

    #[error("reward item not found: {0}")]
    ItemNotFound(DbId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Failure modes of `ValidateVoucher`.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// Expected policy outcome (`AlreadyUsed` / unknown code).
    #[error(transparent)]
    Policy(#[from] VoucherValidationError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Provides the atomic redemption and voucher validation operations.
pub struct RedemptionRepo;

impl RedemptionRepo {
    /// Exchange points for a reward item, atomically.
    ///
    /// Preconditions (balance >= cost, stock > 0) are checked inside the
    /// transaction under row locks; a typed policy failure leaves no
    /// mutation behind. On success: stock - 1, a voucher with a fresh
    /// globally-unique code, and a ledger debit referencing the voucher.
    ///
    /// Not idempotent: each call redeems once. Callers must not blindly
    /// retry on timeout without checking whether a voucher was created.
    pub async fn redeem(
        pool: &PgPool,
        citizen_id: DbId,
        item_id: DbId,
    ) -> Result<Voucher, RedeemError> {
        let mut tx = pool.begin().await.map_err(RedeemError::Database)?;

        // Lock the citizen row: serializes balance checks for this citizen
        // across concurrent redemptions of different items.
        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(citizen_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(RedeemError::Database)?;

        // Lock the item row: serializes stock decrements for this item.
        let item: Option<(i64, i32)> = sqlx::query_as(
            "SELECT cost_points, stock FROM reward_items WHERE id = $1 FOR UPDATE",
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RedeemError::Database)?;

        let Some((cost, stock)) = item else {
            return Err(RedeemError::ItemNotFound(item_id));
        };

        if stock <= 0 {
            return Err(RedemptionError::OutOfStock.into());
        }

        let balance: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM points_ledger WHERE citizen_id = $1",
        )
        .bind(citizen_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RedeemError::Database)?;

        if balance < cost {
            return Err(RedemptionError::InsufficientPoints { balance, cost }.into());
        }

        // The stock > 0 guard is redundant under the row lock but keeps the
        // CHECK constraint from ever being the last line of defense.
        let decremented = sqlx::query(
            "UPDATE reward_items SET stock = stock - 1, updated_at = NOW() \
             WHERE id = $1 AND stock > 0",
        )
        .bind(item_id)
        .execute(&mut *tx)
        .await
        .map_err(RedeemError::Database)?;

        if decremented.rows_affected() == 0 {
            return Err(RedemptionError::OutOfStock.into());
        }

        let voucher = Self::insert_voucher(&mut tx, citizen_id, item_id).await?;

        sqlx::query(
            "INSERT INTO points_ledger (citizen_id, amount, reason, voucher_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(citizen_id)
        .bind(-cost)
        .bind(civitrack_core::points::REASON_REDEMPTION_DEBIT)
        .bind(voucher.id)
        .execute(&mut *tx)
        .await
        .map_err(RedeemError::Database)?;

        tx.commit().await.map_err(RedeemError::Database)?;
        Ok(voucher)
    }

    /// Staff-side validation: flip a voucher `unused -> used` exactly once.
    ///
    /// The compare-and-set on the status means a code can never flip twice;
    /// a second validation gets `AlreadyUsed`, not a silent no-op.
    pub async fn validate(pool: &PgPool, code: &str) -> Result<Voucher, ValidateError> {
        let update = format!(
            "UPDATE vouchers SET status_id = $2, used_at = NOW() \
             WHERE code = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let voucher = sqlx::query_as::<_, Voucher>(&update)
            .bind(code)
            .bind(VoucherStatus::Used.id())
            .bind(VoucherStatus::Unused.id())
            .fetch_optional(pool)
            .await
            .map_err(ValidateError::Database)?;

        if let Some(voucher) = voucher {
            return Ok(voucher);
        }

        // Distinguish an already-used code from an unknown one.
        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM vouchers WHERE code = $1")
            .bind(code)
            .fetch_optional(pool)
            .await
            .map_err(ValidateError::Database)?;

        match exists {
            Some(_) => Err(VoucherValidationError::AlreadyUsed.into()),
            None => Err(VoucherValidationError::UnknownCode.into()),
        }
    }

    /// List a citizen's vouchers, newest first.
    pub async fn list_for_citizen(
        pool: &PgPool,
        citizen_id: DbId,
    ) -> Result<Vec<Voucher>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM vouchers WHERE citizen_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Voucher>(&query)
            .bind(citizen_id)
            .fetch_all(pool)
            .await
    }

    /// Insert the voucher row, regenerating the code on the (rare)
    /// collision.
    ///
    /// Uses `ON CONFLICT DO NOTHING` rather than catching the unique
    /// violation: a constraint error would abort the enclosing transaction,
    /// while the conflict clause lets us retry in place.
    async fn insert_voucher(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        citizen_id: DbId,
        item_id: DbId,
    ) -> Result<Voucher, RedeemError> {
        let insert = format!(
            "INSERT INTO vouchers (citizen_id, item_id, code) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (code) DO NOTHING \
             RETURNING {COLUMNS}"
        );

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code();
            let voucher = sqlx::query_as::<_, Voucher>(&insert)
                .bind(citizen_id)
                .bind(item_id)
                .bind(&code)
                .fetch_optional(&mut **tx)
                .await
                .map_err(RedeemError::Database)?;

            match voucher {
                Some(voucher) => return Ok(voucher),
                None => tracing::warn!(attempt, "Voucher code collision, regenerating"),
            }
        }

        Err(RedeemError::Database(sqlx::Error::Protocol(
            "exhausted voucher code generation attempts".into(),
        )))
    }
}
