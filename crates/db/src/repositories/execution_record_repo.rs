//! Repository for the append-only `execution_records` table.

use civitrack_core::execution::KIND_FINAL;
use civitrack_core::status::AssignmentStatus;
use civitrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::execution_record::{ExecutionRecord, LogExecution};

/// Column list for `execution_records` queries.
const COLUMNS: &str = "id, assignment_id, worker_id, action, photo_urls, kind, created_at";

/// Provides append and listing operations for execution records.
pub struct ExecutionRecordRepo;

impl ExecutionRecordRepo {
    /// Field worker logs one unit of work against an in-progress assignment.
    ///
    /// One transaction: the assignment row is locked and checked to be
    /// `in_progress` and owned by this worker, the record is appended, and a
    /// `final` record moves the assignment into
    /// `pending_agency_verification` (a `progress` record is a self-loop).
    ///
    /// Returns `None` (no mutation) when the assignment is not in progress
    /// or belongs to a different worker.
    pub async fn log(
        pool: &PgPool,
        assignment_id: DbId,
        worker_id: DbId,
        input: &LogExecution,
    ) -> Result<Option<ExecutionRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let eligible: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM assignments \
             WHERE id = $1 AND worker_id = $2 AND status_id = $3 \
             FOR UPDATE",
        )
        .bind(assignment_id)
        .bind(worker_id)
        .bind(AssignmentStatus::InProgress.id())
        .fetch_optional(&mut *tx)
        .await?;

        if eligible.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let insert = format!(
            "INSERT INTO execution_records (assignment_id, worker_id, action, photo_urls, kind) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, ExecutionRecord>(&insert)
            .bind(assignment_id)
            .bind(worker_id)
            .bind(&input.action)
            .bind(&input.photo_urls)
            .bind(&input.kind)
            .fetch_one(&mut *tx)
            .await?;

        if input.kind == KIND_FINAL {
            sqlx::query(
                "UPDATE assignments SET status_id = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(assignment_id)
            .bind(AssignmentStatus::PendingAgencyVerification.id())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(record))
    }

    /// List the records of an assignment, oldest first (append order).
    pub async fn list_for_assignment(
        pool: &PgPool,
        assignment_id: DbId,
    ) -> Result<Vec<ExecutionRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM execution_records \
             WHERE assignment_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ExecutionRecord>(&query)
            .bind(assignment_id)
            .fetch_all(pool)
            .await
    }
}
