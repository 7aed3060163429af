//! User account models (citizens, admins, agency staff).

use civitrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    /// Set for agency staff (supervisors and field workers), NULL otherwise.
    pub agency_id: Option<DbId>,
    pub is_active: bool,
    /// Advisory load counter for field workers.
    pub active_assignment_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert payload for a new user. The password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub agency_id: Option<DbId>,
}
