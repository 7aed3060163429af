//! Assignment entity models: one agency's handling of one report.

use civitrack_core::status::StatusId;
use civitrack_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub report_id: DbId,
    pub agency_id: DbId,
    pub worker_id: Option<DbId>,
    pub status_id: StatusId,
    pub agency_notes: Option<String>,
    pub revision_notes: Option<String>,
    pub assigned_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /assignments/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignWorker {
    pub worker_id: DbId,
}

/// Request body for `POST /assignments/{id}/approve`.
#[derive(Debug, Deserialize)]
pub struct AgencyApprove {
    pub notes: Option<String>,
}

/// Request body for `POST /assignments/{id}/return` (revision request).
#[derive(Debug, Deserialize)]
pub struct ReturnForRevision {
    pub notes: String,
}

/// Result of an agency-level approval: the updated assignment plus whether
/// the parent report crossed the all-agencies barrier in the same
/// transaction.
#[derive(Debug, Serialize)]
pub struct AgencyApprovalOutcome {
    pub assignment: Assignment,
    pub report_advanced: bool,
}

/// An assignment stuck in `awaiting_assignment` with no active field worker
/// in the owning agency. An operator dashboard signal, not a system error.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UnassignableAssignment {
    pub assignment_id: DbId,
    pub report_id: DbId,
    pub agency_id: DbId,
    pub agency_name: String,
    pub created_at: Timestamp,
}
