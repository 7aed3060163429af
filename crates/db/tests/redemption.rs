//! Integration tests for the redemption engine: atomicity, stock safety
//! under concurrency, and one-shot voucher validation.

mod common;

use assert_matches::assert_matches;
use civitrack_core::points::REASON_REDEMPTION_DEBIT;
use civitrack_core::redemption::{
    is_well_formed_code, RedemptionError, VoucherValidationError,
};
use civitrack_core::status::VoucherStatus;
use civitrack_db::repositories::{
    PointsRepo, RedeemError, RedemptionRepo, RewardRepo, ValidateError,
};
use sqlx::PgPool;

async fn stock_of(pool: &PgPool, item_id: i64) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM reward_items WHERE id = $1")
        .bind(item_id)
        .fetch_one(pool)
        .await
        .unwrap();
    stock
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn successful_redemption_moves_stock_points_and_voucher_together(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 100).await;
    let item = common::create_reward_item(&pool, 40, 3).await;

    let voucher = RedemptionRepo::redeem(&pool, citizen.id, item.id)
        .await
        .expect("redeem");

    assert_eq!(voucher.citizen_id, citizen.id);
    assert_eq!(voucher.item_id, item.id);
    assert_eq!(voucher.status_id, VoucherStatus::Unused.id());
    assert!(is_well_formed_code(&voucher.code));

    assert_eq!(stock_of(&pool, item.id).await, 2);
    assert_eq!(PointsRepo::balance(&pool, citizen.id).await.unwrap(), 60);

    // The debit references the voucher it paid for.
    let entries = PointsRepo::list_for_citizen(&pool, citizen.id).await.unwrap();
    let debit = entries
        .iter()
        .find(|e| e.amount < 0)
        .expect("debit entry");
    assert_eq!(debit.amount, -40);
    assert_eq!(debit.reason, REASON_REDEMPTION_DEBIT);
    assert_eq!(debit.voucher_id, Some(voucher.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insufficient_points_leaves_no_trace(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 30).await;
    let item = common::create_reward_item(&pool, 40, 3).await;

    let err = RedemptionRepo::redeem(&pool, citizen.id, item.id)
        .await
        .expect_err("must fail");
    assert_matches!(
        err,
        RedeemError::Policy(RedemptionError::InsufficientPoints { balance: 30, cost: 40 })
    );

    // Nothing moved.
    assert_eq!(stock_of(&pool, item.id).await, 3);
    assert_eq!(PointsRepo::balance(&pool, citizen.id).await.unwrap(), 30);
    let vouchers = RedemptionRepo::list_for_citizen(&pool, citizen.id).await.unwrap();
    assert!(vouchers.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_stock_leaves_no_trace(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 100).await;
    let item = common::create_reward_item(&pool, 40, 0).await;

    let err = RedemptionRepo::redeem(&pool, citizen.id, item.id)
        .await
        .expect_err("must fail");
    assert_matches!(err, RedeemError::Policy(RedemptionError::OutOfStock));

    assert_eq!(PointsRepo::balance(&pool, citizen.id).await.unwrap(), 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_item_is_not_found(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 100).await;

    let err = RedemptionRepo::redeem(&pool, citizen.id, 424242)
        .await
        .expect_err("must fail");
    assert_matches!(err, RedeemError::ItemNotFound(424242));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_redemptions_of_the_last_unit_never_oversell(pool: PgPool) {
    let alice = common::create_citizen(&pool, "alice").await;
    let carol = common::create_citizen(&pool, "carol").await;
    common::credit_points(&pool, alice.id, 100).await;
    common::credit_points(&pool, carol.id, 100).await;
    let item = common::create_reward_item(&pool, 40, 1).await;

    let (a, b) = tokio::join!(
        RedemptionRepo::redeem(&pool, alice.id, item.id),
        RedemptionRepo::redeem(&pool, carol.id, item.id),
    );

    // Exactly one winner; the loser sees OutOfStock, never negative stock.
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    for result in [a, b] {
        if let Err(err) = result {
            assert_matches!(err, RedeemError::Policy(RedemptionError::OutOfStock));
        }
    }
    assert_eq!(stock_of(&pool, item.id).await, 0);

    // Exactly one debit across both citizens.
    let debits: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM points_ledger WHERE reason = $1",
    )
    .bind(REASON_REDEMPTION_DEBIT)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(debits, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn voucher_validates_exactly_once(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 100).await;
    let item = common::create_reward_item(&pool, 40, 1).await;
    let voucher = RedemptionRepo::redeem(&pool, citizen.id, item.id)
        .await
        .unwrap();

    let used = RedemptionRepo::validate(&pool, &voucher.code)
        .await
        .expect("first validation");
    assert_eq!(used.status_id, VoucherStatus::Used.id());
    assert!(used.used_at.is_some());

    let err = RedemptionRepo::validate(&pool, &voucher.code)
        .await
        .expect_err("second validation must fail");
    assert_matches!(
        err,
        ValidateError::Policy(VoucherValidationError::AlreadyUsed)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_voucher_code_is_distinguished_from_used(pool: PgPool) {
    let err = RedemptionRepo::validate(&pool, "CVT-ZZZZ-ZZZZ")
        .await
        .expect_err("must fail");
    assert_matches!(
        err,
        ValidateError::Policy(VoucherValidationError::UnknownCode)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn balance_is_the_sum_of_the_ledger(pool: PgPool) {
    let citizen = common::create_citizen(&pool, "alice").await;
    common::credit_points(&pool, citizen.id, 50).await;
    common::credit_points(&pool, citizen.id, 50).await;
    let item = common::create_reward_item(&pool, 30, 5).await;

    RedemptionRepo::redeem(&pool, citizen.id, item.id).await.unwrap();
    RedemptionRepo::redeem(&pool, citizen.id, item.id).await.unwrap();

    assert_eq!(PointsRepo::balance(&pool, citizen.id).await.unwrap(), 40);
    let entries = PointsRepo::list_for_citizen(&pool, citizen.id).await.unwrap();
    assert_eq!(entries.len(), 4);

    // Restock is additive.
    let item = RewardRepo::restock(&pool, item.id, 10).await.unwrap().unwrap();
    assert_eq!(item.stock, 13);
}
