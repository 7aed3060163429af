//! HTTP-level integration tests for registration, login, and RBAC
//! enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, register_citizen};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_citizen_and_returns_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "maria",
        "email": "maria@test.com",
        "password": "a_decent_password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["username"], "maria");
    assert_eq!(json["user"]["role"], "citizen");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_duplicate_username(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_citizen(app, "maria").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "maria",
        "email": "other@test.com",
        "password": "a_decent_password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_invalid_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "maria",
        "email": "not-an-email",
        "password": "a_decent_password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "maria",
        "email": "maria@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_succeeds_with_correct_credentials(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_citizen(app, "maria").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "maria", "password": "test_password_123!" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["email"], "maria@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_citizen(app, "maria").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "maria", "password": "incorrect_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_unknown_username(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_rejects_deactivated_account(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register_citizen(app, "maria").await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE username = 'maria'")
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "username": "maria", "password": "test_password_123!" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn protected_endpoints_require_a_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/reports").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/reports", "not-a-real-token").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn citizens_cannot_reach_admin_endpoints(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = register_citizen(app, "maria").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "name": "Roads Dept", "category": "roads" });
    let response = common::post_json_auth(app, "/api/v1/agencies", body, &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
