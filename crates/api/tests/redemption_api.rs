//! HTTP-level integration tests for the reward catalog, redemption, and
//! voucher validation endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_staff_user, get_auth, post_json_auth, register_citizen};
use sqlx::PgPool;

async fn create_reward(pool: &PgPool, admin: &str, cost_points: i64, stock: i32) -> i64 {
    let body = serde_json::json!({
        "name": "Transit pass",
        "partner": "City Transit",
        "cost_points": cost_points,
        "stock": stock,
    });
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/rewards",
        body,
        admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Credit points to a citizen the way report completion does, without
/// driving the whole lifecycle.
async fn credit_points(pool: &PgPool, token: &str, amount: i64) {
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/points/balance",
        token,
    )
    .await;
    let citizen_id = body_json(response).await["citizen_id"].as_i64().unwrap();

    sqlx::query(
        "INSERT INTO points_ledger (citizen_id, amount, reason) \
         VALUES ($1, $2, 'report_completion_reward')",
    )
    .bind(citizen_id)
    .bind(amount)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn redemption_issues_a_voucher_and_debits_points(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;
    let item_id = create_reward(&pool, &admin, 40, 5).await;
    credit_points(&pool, &citizen, 100).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/redeem"),
        serde_json::json!({}),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let voucher = body_json(response).await;
    let code = voucher["code"].as_str().unwrap().to_string();
    assert!(code.starts_with("CVT-"));
    assert_eq!(voucher["status_id"], 1); // unused

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/points/balance",
        &citizen,
    )
    .await;
    assert_eq!(body_json(response).await["balance"], 60);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers",
        &citizen,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insufficient_points_is_unprocessable(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;
    let item_id = create_reward(&pool, &admin, 40, 5).await;
    credit_points(&pool, &citizen, 30).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/redeem"),
        serde_json::json!({}),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INSUFFICIENT_POINTS");

    // Nothing was debited.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/points/balance",
        &citizen,
    )
    .await;
    assert_eq!(body_json(response).await["balance"], 30);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_stock_conflicts(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;
    let item_id = create_reward(&pool, &admin, 40, 0).await;
    credit_points(&pool, &citizen, 100).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/redeem"),
        serde_json::json!({}),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "OUT_OF_STOCK");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_reward_item_is_not_found(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/rewards/424242/redeem",
        serde_json::json!({}),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn voucher_validates_exactly_once(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;
    let item_id = create_reward(&pool, &admin, 40, 5).await;
    credit_points(&pool, &citizen, 100).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/redeem"),
        serde_json::json!({}),
        &citizen,
    )
    .await;
    let code = body_json(response).await["code"].as_str().unwrap().to_string();

    // Staff marks it used.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers/validate",
        serde_json::json!({ "code": code }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let used = body_json(response).await;
    assert_eq!(used["status_id"], 2); // used
    assert!(used["used_at"].is_string());

    // A second attempt is distinguishable from an unknown code.
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers/validate",
        serde_json::json!({ "code": code }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_USED");

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers/validate",
        serde_json::json!({ "code": "CVT-ZZZZ-ZZZZ" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_voucher_codes_are_rejected_up_front(pool: PgPool) {
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers/validate",
        serde_json::json!({ "code": "garbage" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn citizens_cannot_validate_vouchers(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/vouchers/validate",
        serde_json::json!({ "code": "CVT-AAAA-AAAA" }),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restock_is_admin_only_and_additive(pool: PgPool) {
    let citizen = register_citizen(common::build_test_app(pool.clone()), "maria").await;
    let (_, admin) = create_staff_user(
        &pool,
        common::build_test_app(pool.clone()),
        "admin",
        "admin",
        None,
    )
    .await;
    let item_id = create_reward(&pool, &admin, 40, 3).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/restock"),
        serde_json::json!({ "additional": 10 }),
        &citizen,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/rewards/{item_id}/restock"),
        serde_json::json!({ "additional": 10 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["stock"], 13);
}
