//! Report entity models and DTOs for the complaint lifecycle.

use civitrack_core::status::StatusId;
use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub citizen_id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Opaque media-storage URLs, stored verbatim.
    pub photo_urls: Vec<String>,
    pub status_id: StatusId,
    /// AI suggestion metadata, immutable once written at creation.
    pub suggested_agency_ids: Vec<DbId>,
    pub suggestion_confidence: i16,
    pub suggestion_reasoning: Vec<String>,
    pub decision_source: String,
    pub rejection_reason: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// Request body for `POST /reports` (citizen submission).
#[derive(Debug, Deserialize)]
pub struct SubmitReport {
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Insert payload assembled by the submission handler after the routing
/// advisor has run.
#[derive(Debug)]
pub struct CreateReport {
    pub citizen_id: DbId,
    pub submission: SubmitReport,
    pub suggested_agency_ids: Vec<DbId>,
    pub suggestion_confidence: i16,
    pub suggestion_reasoning: Vec<String>,
    pub decision_source: &'static str,
}

/// Request body for `POST /reports/{id}/route` (admin routing decision).
#[derive(Debug, Deserialize)]
pub struct RouteReport {
    /// Agencies to create assignments for. May differ from the AI
    /// suggestion; the admin has final say.
    pub agency_ids: Vec<DbId>,
}

/// Request body for `POST /reports/{id}/reject`.
#[derive(Debug, Deserialize)]
pub struct RejectReport {
    pub reason: String,
}

/// Query parameters for `GET /reports`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
    pub status_id: Option<StatusId>,
    /// Maximum number of results. Defaults to 50, clamped to 0..=100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0, negatives treated as 0.
    pub offset: Option<i64>,
}
