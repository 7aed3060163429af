//! Shared fixtures for db integration tests.

use civitrack_core::roles::{ROLE_CITIZEN, ROLE_FIELD_WORKER};
use civitrack_core::routing::DECISION_SOURCE_MANUAL_REVIEW;
use civitrack_core::status::URGENCY_MEDIUM;
use civitrack_db::models::agency::{Agency, CreateAgency};
use civitrack_db::models::report::{CreateReport, Report, SubmitReport};
use civitrack_db::models::reward::{CreateRewardItem, RewardItem};
use civitrack_db::models::user::{CreateUser, User};
use civitrack_db::repositories::{AgencyRepo, ReportRepo, RewardRepo, UserRepo};
use sqlx::PgPool;

pub async fn create_citizen(pool: &PgPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            password_hash: "$argon2id$test".to_string(),
            role: ROLE_CITIZEN.to_string(),
            agency_id: None,
        },
    )
    .await
    .expect("create citizen")
}

pub async fn create_agency(pool: &PgPool, name: &str) -> Agency {
    AgencyRepo::create(
        pool,
        &CreateAgency {
            name: name.to_string(),
            category: "roads".to_string(),
        },
    )
    .await
    .expect("create agency")
}

pub async fn create_worker(pool: &PgPool, agency_id: i64, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            password_hash: "$argon2id$test".to_string(),
            role: ROLE_FIELD_WORKER.to_string(),
            agency_id: Some(agency_id),
        },
    )
    .await
    .expect("create worker")
}

pub async fn submit_report(pool: &PgPool, citizen_id: i64) -> Report {
    ReportRepo::create(
        pool,
        &CreateReport {
            citizen_id,
            submission: SubmitReport {
                title: "Pothole on Elm Street".to_string(),
                description: "Deep pothole near the crossing".to_string(),
                category: "roads".to_string(),
                urgency: URGENCY_MEDIUM.to_string(),
                address: "12 Elm Street".to_string(),
                latitude: Some(52.37),
                longitude: Some(4.89),
                photo_urls: vec!["https://media.example.org/p1.jpg".to_string()],
            },
            suggested_agency_ids: vec![],
            suggestion_confidence: 0,
            suggestion_reasoning: vec!["classifier unavailable".to_string()],
            decision_source: DECISION_SOURCE_MANUAL_REVIEW,
        },
    )
    .await
    .expect("submit report")
}

pub async fn create_reward_item(pool: &PgPool, cost_points: i64, stock: i32) -> RewardItem {
    RewardRepo::create(
        pool,
        &CreateRewardItem {
            name: "Transit pass".to_string(),
            partner: "City Transit".to_string(),
            description: None,
            cost_points,
            stock,
        },
    )
    .await
    .expect("create reward item")
}

/// Credit points directly into the ledger (test shortcut for the
/// report-completion reward).
pub async fn credit_points(pool: &PgPool, citizen_id: i64, amount: i64) {
    sqlx::query(
        "INSERT INTO points_ledger (citizen_id, amount, reason) \
         VALUES ($1, $2, 'report_completion_reward')",
    )
    .bind(citizen_id)
    .bind(amount)
    .execute(pool)
    .await
    .expect("credit points");
}
