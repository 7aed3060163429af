//! Repository for the `reports` table: the report lifecycle state machine's
//! persistence.
//!
//! Status changes are compare-and-set (`WHERE status_id = expected`), so a
//! racing or illegal transition updates zero rows and the caller sees
//! `None` instead of a silently-corrupted state.

use civitrack_core::status::{AssignmentStatus, ReportStatus};
use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::assignment::Assignment;
use crate::models::points::LedgerEntry;
use crate::models::report::{CreateReport, Report, ReportListQuery};

/// Column list for `reports` queries.
const COLUMNS: &str = "\
    id, citizen_id, title, description, category, urgency, address, \
    latitude, longitude, photo_urls, status_id, suggested_agency_ids, \
    suggestion_confidence, suggestion_reasoning, decision_source, \
    rejection_reason, created_at, completed_at";

/// Maximum page size for report listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for report listing.
const DEFAULT_LIMIT: i64 = 50;

/// Completed report plus the ledger credit written in the same transaction.
#[derive(Debug)]
pub struct CompletedReport {
    pub report: Report,
    pub credit: LedgerEntry,
}

/// Provides lifecycle operations for citizen reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report in `awaiting_verification`.
    ///
    /// The advisor has already run; its suggestion metadata is written here
    /// once and never updated afterwards.
    pub async fn create(pool: &PgPool, input: &CreateReport) -> Result<Report, sqlx::Error> {
        let query = format!(
            "INSERT INTO reports \
                 (citizen_id, title, description, category, urgency, address, \
                  latitude, longitude, photo_urls, status_id, \
                  suggested_agency_ids, suggestion_confidence, \
                  suggestion_reasoning, decision_source) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(input.citizen_id)
            .bind(&input.submission.title)
            .bind(&input.submission.description)
            .bind(&input.submission.category)
            .bind(&input.submission.urgency)
            .bind(&input.submission.address)
            .bind(input.submission.latitude)
            .bind(input.submission.longitude)
            .bind(&input.submission.photo_urls)
            .bind(ReportStatus::AwaitingVerification.id())
            .bind(&input.suggested_agency_ids)
            .bind(input.suggestion_confidence)
            .bind(&input.suggestion_reasoning)
            .bind(input.decision_source)
            .fetch_one(pool)
            .await
    }

    /// Find a report by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports for one citizen with optional status filter.
    pub async fn list_by_citizen(
        pool: &PgPool,
        citizen_id: DbId,
        params: &ReportListQuery,
    ) -> Result<Vec<Report>, sqlx::Error> {
        Self::list_reports(pool, Some(citizen_id), params).await
    }

    /// List all reports (admin view) with optional status filter.
    pub async fn list_all(
        pool: &PgPool,
        params: &ReportListQuery,
    ) -> Result<Vec<Report>, sqlx::Error> {
        Self::list_reports(pool, None, params).await
    }

    /// Admin routing decision: `awaiting_verification -> routed`, creating
    /// one assignment per chosen agency in the same transaction.
    ///
    /// Returns `None` (and makes no mutation) when the report is not in
    /// `awaiting_verification`.
    pub async fn route(
        pool: &PgPool,
        report_id: DbId,
        agency_ids: &[DbId],
    ) -> Result<Option<(Report, Vec<Assignment>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE reports SET status_id = $2 \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&update)
            .bind(report_id)
            .bind(ReportStatus::Routed.id())
            .bind(ReportStatus::AwaitingVerification.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO assignments (report_id, agency_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             RETURNING {}",
            super::assignment_repo::COLUMNS
        );
        let assignments = sqlx::query_as::<_, Assignment>(&insert)
            .bind(report_id)
            .bind(agency_ids)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((report, assignments)))
    }

    /// Explicit admin rejection from any active state. Terminal.
    ///
    /// One transaction: the report moves to `rejected`, every assignment
    /// that has not finished is cancelled, and the cancelled assignments'
    /// workers get their load counters released. Work on a rejected report
    /// must stop, so the sub-workflow is closed out here rather than left
    /// running against a dead parent.
    ///
    /// Returns `None` (no mutation) when the report is already terminal.
    pub async fn reject(
        pool: &PgPool,
        report_id: DbId,
        reason: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE reports SET status_id = $2, rejection_reason = $3 \
             WHERE id = $1 AND NOT (status_id = ANY($4)) \
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&update)
            .bind(report_id)
            .bind(ReportStatus::Rejected.id())
            .bind(reason)
            .bind(ReportStatus::terminal_ids())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            tx.rollback().await?;
            return Ok(None);
        };

        let worker_ids: Vec<Option<DbId>> = sqlx::query_scalar(
            "UPDATE assignments SET status_id = $2, updated_at = NOW() \
             WHERE report_id = $1 AND NOT (status_id = ANY($3)) \
             RETURNING worker_id",
        )
        .bind(report_id)
        .bind(AssignmentStatus::Cancelled.id())
        .bind(AssignmentStatus::terminal_ids())
        .fetch_all(&mut *tx)
        .await?;

        let worker_ids: Vec<DbId> = worker_ids.into_iter().flatten().collect();
        if !worker_ids.is_empty() {
            sqlx::query(
                "UPDATE users \
                 SET active_assignment_count = GREATEST(active_assignment_count - 1, 0), \
                     updated_at = NOW() \
                 WHERE id = ANY($1)",
            )
            .bind(&worker_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(report))
    }

    /// Central admin approval: `awaiting_final_approval -> completed`.
    ///
    /// One transaction: stamp `completed_at`, complete every assignment
    /// sitting in `pending_central_verification`, release the workers' load
    /// counters, and credit the reporting citizen. If any write fails the
    /// whole unit rolls back and the report stays in
    /// `awaiting_final_approval`.
    ///
    /// Returns `None` (no mutation) when the report is not awaiting final
    /// approval.
    pub async fn approve_completion(
        pool: &PgPool,
        report_id: DbId,
        reward_points: i64,
    ) -> Result<Option<CompletedReport>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE reports SET status_id = $2, completed_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&update)
            .bind(report_id)
            .bind(ReportStatus::Completed.id())
            .bind(ReportStatus::AwaitingFinalApproval.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(report) = report else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Completion is report-scoped: assignments never self-complete.
        let worker_ids: Vec<Option<DbId>> = sqlx::query_scalar(
            "UPDATE assignments SET status_id = $2, updated_at = NOW() \
             WHERE report_id = $1 AND status_id = $3 \
             RETURNING worker_id",
        )
        .bind(report_id)
        .bind(AssignmentStatus::Complete.id())
        .bind(AssignmentStatus::PendingCentralVerification.id())
        .fetch_all(&mut *tx)
        .await?;

        let worker_ids: Vec<DbId> = worker_ids.into_iter().flatten().collect();
        if !worker_ids.is_empty() {
            sqlx::query(
                "UPDATE users \
                 SET active_assignment_count = GREATEST(active_assignment_count - 1, 0), \
                     updated_at = NOW() \
                 WHERE id = ANY($1)",
            )
            .bind(&worker_ids)
            .execute(&mut *tx)
            .await?;
        }

        let credit = sqlx::query_as::<_, LedgerEntry>(
            "INSERT INTO points_ledger (citizen_id, amount, reason, report_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, citizen_id, amount, reason, report_id, voucher_id, created_at",
        )
        .bind(report.citizen_id)
        .bind(reward_points)
        .bind(civitrack_core::points::REASON_REPORT_COMPLETION)
        .bind(report_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(CompletedReport { report, credit }))
    }

    /// Shared listing query builder. When `citizen_id` is `Some`, filters to
    /// that citizen's reports; when `None`, returns all reports (admin view).
    async fn list_reports(
        pool: &PgPool,
        citizen_id: Option<DbId>,
        params: &ReportListQuery,
    ) -> Result<Vec<Report>, sqlx::Error> {
        // Clamp caller-supplied paging so negative values cannot reach SQL.
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(0, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if citizen_id.is_some() {
            conditions.push(format!("citizen_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM reports \
             {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Report>(&query);
        if let Some(cid) = citizen_id {
            q = q.bind(cid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }
}
