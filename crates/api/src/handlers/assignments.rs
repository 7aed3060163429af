//! Handlers for the `/assignments` resource: the per-agency execution
//! sub-workflow (worker assignment, execution records, agency verification).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use civitrack_core::error::CoreError;
use civitrack_core::execution::{validate_kind, validate_revision_notes};
use civitrack_core::roles::{ROLE_CITIZEN, ROLE_FIELD_WORKER};
use civitrack_core::status::AssignmentStatus;
use civitrack_core::types::DbId;
use civitrack_db::models::assignment::{
    AgencyApprove, AgencyApprovalOutcome, Assignment, AssignWorker, ReturnForRevision,
    UnassignableAssignment,
};
use civitrack_db::models::execution_record::{ExecutionRecord, LogExecution};
use civitrack_db::repositories::{
    AssignmentRepo, ExecutionRecordRepo, ReportRepo, UserRepo,
};
use civitrack_events::bus::EVENT_ASSIGNMENT_RETURNED;
use civitrack_events::PlatformEvent;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireSupervisor, RequireWorker};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /assignments/{id}/executions`.
#[derive(Debug, Deserialize, Validate)]
pub struct LogExecutionPayload {
    #[validate(length(min = 1, max = 2000))]
    pub action: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub kind: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/assignments
///
/// Assignments of the supervisor's own agency.
pub async fn list_for_agency(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let agency_id = staff_agency(&state, user.user_id).await?;
    let assignments = AssignmentRepo::list_for_agency(&state.pool, agency_id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

/// GET /api/v1/assignments/unassignable
///
/// Admin dashboard signal: assignments stuck because their agency has no
/// active field worker.
pub async fn list_unassignable(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UnassignableAssignment>>>> {
    let stuck = AssignmentRepo::list_unassignable(&state.pool).await?;
    Ok(Json(DataResponse { data: stuck }))
}

/// POST /api/v1/assignments/{id}/assign
///
/// Supervisor picks a field worker from their own agency.
pub async fn assign_worker(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
    Json(input): Json<AssignWorker>,
) -> AppResult<Json<Assignment>> {
    let agency_id = staff_agency(&state, user.user_id).await?;
    let assignment = find_assignment(&state, id).await?;
    if assignment.agency_id != agency_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Assignment belongs to a different agency".into(),
        )));
    }

    let worker = UserRepo::find_by_id(&state.pool, input.worker_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "user",
                id: input.worker_id,
            })
        })?;
    if worker.role != ROLE_FIELD_WORKER || worker.agency_id != Some(agency_id) {
        return Err(AppError::Core(CoreError::Validation(
            "Worker must be an active field worker of this agency".into(),
        )));
    }
    if !worker.is_active {
        return Err(AppError::Core(CoreError::Validation(
            "Worker account is deactivated".into(),
        )));
    }

    assignment_status(&assignment)?.transition_to(AssignmentStatus::Assigned)?;

    let assignment = AssignmentRepo::assign_worker(&state.pool, id, worker.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Assignment is not awaiting assignment".into(),
            ))
        })?;

    tracing::info!(assignment_id = id, worker_id = worker.id, "Worker assigned");
    Ok(Json(assignment))
}

/// POST /api/v1/assignments/{id}/start
///
/// The assigned field worker acknowledges start of work.
pub async fn start_work(
    State(state): State<AppState>,
    RequireWorker(user): RequireWorker,
    Path(id): Path<DbId>,
) -> AppResult<Json<Assignment>> {
    match AssignmentRepo::start_work(&state.pool, id, user.user_id).await? {
        Some(assignment) => Ok(Json(assignment)),
        None => Err(explain_worker_rejection(
            &state,
            id,
            user.user_id,
            Some(AssignmentStatus::InProgress),
        )
        .await?),
    }
}

/// POST /api/v1/assignments/{id}/executions
///
/// The assigned field worker logs a progress or final execution record.
pub async fn log_execution(
    State(state): State<AppState>,
    RequireWorker(user): RequireWorker,
    Path(id): Path<DbId>,
    Json(input): Json<LogExecutionPayload>,
) -> AppResult<(StatusCode, Json<ExecutionRecord>)> {
    input.validate()?;
    validate_kind(&input.kind).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let log = LogExecution {
        action: input.action,
        photo_urls: input.photo_urls,
        kind: input.kind,
    };

    match ExecutionRecordRepo::log(&state.pool, id, user.user_id, &log).await? {
        Some(record) => Ok((StatusCode::CREATED, Json(record))),
        None => Err(explain_worker_rejection(&state, id, user.user_id, None).await?),
    }
}

/// GET /api/v1/assignments/{id}/executions
pub async fn list_executions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ExecutionRecord>>>> {
    let assignment = find_assignment(&state, id).await?;

    // Citizens may only see records on their own reports.
    if user.role == ROLE_CITIZEN {
        let report = ReportRepo::find_by_id(&state.pool, assignment.report_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound {
                    entity: "report",
                    id: assignment.report_id,
                })
            })?;
        if report.citizen_id != user.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "Not your report".into(),
            )));
        }
    }

    let records = ExecutionRecordRepo::list_for_assignment(&state.pool, id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// POST /api/v1/assignments/{id}/approve
///
/// Supervisor approves the finished work. When this was the last pending
/// assignment, the parent report advances to awaiting final approval.
pub async fn approve(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
    Json(input): Json<AgencyApprove>,
) -> AppResult<Json<AgencyApprovalOutcome>> {
    let agency_id = staff_agency(&state, user.user_id).await?;
    let assignment = find_assignment(&state, id).await?;
    if assignment.agency_id != agency_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Assignment belongs to a different agency".into(),
        )));
    }

    assignment_status(&assignment)?
        .transition_to(AssignmentStatus::PendingCentralVerification)?;

    let outcome = AssignmentRepo::approve_by_agency(&state.pool, id, input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Assignment is not pending agency verification".into(),
            ))
        })?;

    Ok(Json(outcome))
}

/// POST /api/v1/assignments/{id}/return
///
/// Supervisor sends the work back to the field worker with mandatory notes.
pub async fn return_for_revision(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
    Json(input): Json<ReturnForRevision>,
) -> AppResult<Json<Assignment>> {
    validate_revision_notes(&input.notes)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let agency_id = staff_agency(&state, user.user_id).await?;
    let assignment = find_assignment(&state, id).await?;
    if assignment.agency_id != agency_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Assignment belongs to a different agency".into(),
        )));
    }

    assignment_status(&assignment)?.transition_to(AssignmentStatus::InProgress)?;

    let assignment = AssignmentRepo::return_for_revision(&state.pool, id, &input.notes)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Assignment is not pending agency verification".into(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_ASSIGNMENT_RETURNED)
            .with_source("assignment", assignment.id)
            .with_actor(user.user_id)
            .with_payload(json!({ "notes": input.notes })),
    );

    Ok(Json(assignment))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_assignment(state: &AppState, id: DbId) -> AppResult<Assignment> {
    AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "assignment",
                id,
            })
        })
}

/// Resolve the agency a staff member belongs to.
async fn staff_agency(state: &AppState, user_id: DbId) -> AppResult<DbId> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    user.agency_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Account is not attached to an agency".into(),
        ))
    })
}

/// Decode the stored status ID against the sub-workflow enum.
fn assignment_status(assignment: &Assignment) -> AppResult<AssignmentStatus> {
    AssignmentStatus::from_id(assignment.status_id).ok_or_else(|| {
        AppError::InternalError(format!(
            "unknown assignment status id {}",
            assignment.status_id
        ))
    })
}

/// Disambiguate a CAS refusal on a worker operation: missing assignment is
/// 404, someone else's assignment is 403, a wrong state is 409 naming the
/// refused edge when the operation targets one.
async fn explain_worker_rejection(
    state: &AppState,
    assignment_id: DbId,
    worker_id: DbId,
    target: Option<AssignmentStatus>,
) -> Result<AppError, AppError> {
    let assignment = find_assignment(state, assignment_id).await?;
    if assignment.worker_id != Some(worker_id) {
        return Ok(AppError::Core(CoreError::Forbidden(
            "Assignment belongs to a different worker".into(),
        )));
    }
    if let Some(target) = target {
        if let Err(err) = assignment_status(&assignment)?.transition_to(target) {
            return Ok(AppError::Transition(err));
        }
    }
    Ok(AppError::Core(CoreError::Conflict(
        "Assignment is not in a state that allows this action".into(),
    )))
}
