//! Repository for the `assignments` table: the per-agency sub-workflow.
//!
//! The agency-approval path holds the parent report row lock (`FOR UPDATE`)
//! while it re-evaluates the all-agencies barrier, so two supervisors
//! approving the last two assignments concurrently serialize on the report
//! and exactly one of them flips it to `awaiting_final_approval`.

use civitrack_core::status::{AssignmentStatus, ReportStatus};
use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::{AgencyApprovalOutcome, Assignment, UnassignableAssignment};

/// Column list for `assignments` queries. Shared with the routing insert in
/// `report_repo`.
pub(crate) const COLUMNS: &str = "\
    id, report_id, agency_id, worker_id, status_id, agency_notes, \
    revision_notes, assigned_at, created_at, updated_at";

/// Provides sub-workflow operations for assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Find an assignment by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the assignments of a report, oldest first.
    pub async fn list_for_report(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments WHERE report_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    /// List assignments handled by one agency.
    pub async fn list_for_agency(
        pool: &PgPool,
        agency_id: DbId,
    ) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments WHERE agency_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }

    /// Supervisor picks a field worker: `awaiting_assignment -> assigned`.
    ///
    /// One transaction: CAS the assignment, bump the worker's advisory load
    /// counter, and flip the parent report `routed -> in_progress` if this
    /// is the first assignment to leave `awaiting_assignment`.
    ///
    /// Returns `None` (no mutation) when the assignment is not awaiting
    /// assignment.
    pub async fn assign_worker(
        pool: &PgPool,
        assignment_id: DbId,
        worker_id: DbId,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE assignments \
             SET status_id = $2, worker_id = $3, assigned_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        let assignment = sqlx::query_as::<_, Assignment>(&update)
            .bind(assignment_id)
            .bind(AssignmentStatus::Assigned.id())
            .bind(worker_id)
            .bind(AssignmentStatus::AwaitingAssignment.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(assignment) = assignment else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE users \
             SET active_assignment_count = active_assignment_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(worker_id)
        .execute(&mut *tx)
        .await?;

        // First pickup moves the report into in_progress; later pickups
        // leave it untouched (guarded by the CAS).
        sqlx::query("UPDATE reports SET status_id = $2 WHERE id = $1 AND status_id = $3")
            .bind(assignment.report_id)
            .bind(ReportStatus::InProgress.id())
            .bind(ReportStatus::Routed.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(assignment))
    }

    /// Field worker acknowledges start: `assigned -> in_progress`.
    ///
    /// Returns `None` when the assignment is not in `assigned` or belongs to
    /// a different worker.
    pub async fn start_work(
        pool: &PgPool,
        assignment_id: DbId,
        worker_id: DbId,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 AND worker_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(assignment_id)
            .bind(AssignmentStatus::InProgress.id())
            .bind(AssignmentStatus::Assigned.id())
            .bind(worker_id)
            .fetch_optional(pool)
            .await
    }

    /// Agency supervisor approves the finished work:
    /// `pending_agency_verification -> pending_central_verification`.
    ///
    /// Inside the same transaction, after locking the parent report row,
    /// the all-agencies barrier is re-evaluated against the live sibling
    /// set: when every assignment of the report has reached
    /// `pending_central_verification`, the report advances
    /// `in_progress -> awaiting_final_approval`.
    ///
    /// Returns `None` (no mutation) when the assignment is not pending
    /// agency verification.
    pub async fn approve_by_agency(
        pool: &PgPool,
        assignment_id: DbId,
        notes: Option<&str>,
    ) -> Result<Option<AgencyApprovalOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Serialize sibling approvals on the parent report row.
        let report_id: Option<DbId> = sqlx::query_scalar(
            "SELECT r.id FROM reports r \
             JOIN assignments a ON a.report_id = r.id \
             WHERE a.id = $1 \
             FOR UPDATE OF r",
        )
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(report_id) = report_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        let update = format!(
            "UPDATE assignments \
             SET status_id = $2, agency_notes = COALESCE($3, agency_notes), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        let assignment = sqlx::query_as::<_, Assignment>(&update)
            .bind(assignment_id)
            .bind(AssignmentStatus::PendingCentralVerification.id())
            .bind(notes)
            .bind(AssignmentStatus::PendingAgencyVerification.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(assignment) = assignment else {
            tx.rollback().await?;
            return Ok(None);
        };

        // All-or-nothing barrier: one lagging sibling blocks the report.
        let laggards: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignments WHERE report_id = $1 AND status_id <> $2",
        )
        .bind(report_id)
        .bind(AssignmentStatus::PendingCentralVerification.id())
        .fetch_one(&mut *tx)
        .await?;

        let mut report_advanced = false;
        if laggards == 0 {
            let rows = sqlx::query(
                "UPDATE reports SET status_id = $2 WHERE id = $1 AND status_id = $3",
            )
            .bind(report_id)
            .bind(ReportStatus::AwaitingFinalApproval.id())
            .bind(ReportStatus::InProgress.id())
            .execute(&mut *tx)
            .await?;
            report_advanced = rows.rows_affected() > 0;
        }

        tx.commit().await?;
        Ok(Some(AgencyApprovalOutcome {
            assignment,
            report_advanced,
        }))
    }

    /// Agency supervisor requests revision:
    /// `pending_agency_verification -> in_progress` with mandatory notes.
    ///
    /// The field worker must log a new `final` execution record to re-enter
    /// verification.
    pub async fn return_for_revision(
        pool: &PgPool,
        assignment_id: DbId,
        notes: &str,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments \
             SET status_id = $2, revision_notes = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(assignment_id)
            .bind(AssignmentStatus::InProgress.id())
            .bind(notes)
            .bind(AssignmentStatus::PendingAgencyVerification.id())
            .fetch_optional(pool)
            .await
    }

    /// Assignments stuck in `awaiting_assignment` whose owning agency has no
    /// active field worker. A reportable operator condition, not an error.
    pub async fn list_unassignable(
        pool: &PgPool,
    ) -> Result<Vec<UnassignableAssignment>, sqlx::Error> {
        sqlx::query_as::<_, UnassignableAssignment>(
            "SELECT a.id AS assignment_id, a.report_id, a.agency_id, \
                    ag.name AS agency_name, a.created_at \
             FROM assignments a \
             JOIN agencies ag ON ag.id = a.agency_id \
             WHERE a.status_id = $1 \
               AND NOT EXISTS ( \
                   SELECT 1 FROM users u \
                   WHERE u.agency_id = a.agency_id \
                     AND u.role = $2 \
                     AND u.is_active \
               ) \
             ORDER BY a.created_at ASC",
        )
        .bind(AssignmentStatus::AwaitingAssignment.id())
        .bind(civitrack_core::roles::ROLE_FIELD_WORKER)
        .fetch_all(pool)
        .await
    }
}
