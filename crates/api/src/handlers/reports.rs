//! Handlers for the `/reports` resource: submission, listing, and the
//! admin-side lifecycle operations (route, reject, final approval).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use civitrack_core::error::CoreError;
use civitrack_core::roles::{ROLE_ADMIN, ROLE_CITIZEN};
use civitrack_core::routing::RoutingDecision;
use civitrack_core::status::{validate_urgency, ReportStatus};
use civitrack_core::types::DbId;
use civitrack_db::models::assignment::Assignment;
use civitrack_db::models::report::{
    CreateReport, RejectReport, Report, ReportListQuery, RouteReport, SubmitReport,
};
use civitrack_db::repositories::{AgencyRepo, AssignmentRepo, ReportRepo};
use civitrack_events::bus::{
    EVENT_REPORT_COMPLETED, EVENT_REPORT_REJECTED, EVENT_REPORT_ROUTED,
};
use civitrack_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireCitizen};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /reports`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitReportPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub urgency: String,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

/// Response for routing: the advanced report and its new assignments.
#[derive(Debug, Serialize)]
pub struct RoutedReport {
    pub report: Report,
    pub assignments: Vec<Assignment>,
}

/// Response for final approval: the completed report and the credit written.
#[derive(Debug, Serialize)]
pub struct ApprovedReport {
    pub report: Report,
    pub credited_points: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/reports
///
/// Citizen submits a new report. The routing advisor runs inline; its
/// suggestion metadata is written once on the created row. Classifier
/// failure degrades the suggestion, it never fails the submission.
pub async fn submit_report(
    State(state): State<AppState>,
    RequireCitizen(user): RequireCitizen,
    Json(input): Json<SubmitReportPayload>,
) -> AppResult<(StatusCode, Json<Report>)> {
    input.validate()?;
    validate_urgency(&input.urgency)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let submission = SubmitReport {
        title: input.title,
        description: input.description,
        category: input.category,
        urgency: input.urgency,
        address: input.address,
        latitude: input.latitude,
        longitude: input.longitude,
        photo_urls: input.photo_urls,
    };

    let agencies = AgencyRepo::list(&state.pool).await?;
    let (decision, output) = state.advisor.suggest(&submission, &agencies).await;

    let (suggested_agency_ids, suggestion_confidence) = match &decision {
        RoutingDecision::Suggested {
            primary,
            related,
            confidence,
        } => {
            let mut ids = vec![*primary];
            ids.extend(related);
            (ids, *confidence)
        }
        RoutingDecision::ManualReview => (Vec::new(), 0),
    };

    let report = ReportRepo::create(
        &state.pool,
        &CreateReport {
            citizen_id: user.user_id,
            submission,
            suggested_agency_ids,
            suggestion_confidence,
            suggestion_reasoning: output.reasoning,
            decision_source: decision.source(),
        },
    )
    .await?;

    tracing::info!(
        report_id = report.id,
        decision_source = report.decision_source,
        "Report submitted"
    );

    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/v1/reports
///
/// Admins see every report; citizens see their own.
pub async fn list_reports(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ReportListQuery>,
) -> AppResult<Json<DataResponse<Vec<Report>>>> {
    let reports = match user.role.as_str() {
        ROLE_ADMIN => ReportRepo::list_all(&state.pool, &params).await?,
        ROLE_CITIZEN => ReportRepo::list_by_citizen(&state.pool, user.user_id, &params).await?,
        _ => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin or citizen role required".into(),
            )))
        }
    };
    Ok(Json(DataResponse { data: reports }))
}

/// GET /api/v1/reports/{id}
///
/// Citizens may only view their own reports; staff and admins may view any.
pub async fn get_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Report>> {
    let report = find_report(&state, id).await?;
    ensure_report_visible(&user, &report)?;
    Ok(Json(report))
}

/// POST /api/v1/reports/{id}/route
///
/// Admin verifies the report and routes it to one or more agencies. The
/// stored suggestion is advisory: the admin's chosen set is what counts.
pub async fn route_report(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RouteReport>,
) -> AppResult<Json<RoutedReport>> {
    if input.agency_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one agency is required".into(),
        )));
    }

    let mut agency_ids = input.agency_ids;
    agency_ids.sort_unstable();
    agency_ids.dedup();

    let existing = AgencyRepo::count_existing(&state.pool, &agency_ids).await?;
    if existing != agency_ids.len() as i64 {
        return Err(AppError::Core(CoreError::Validation(
            "One or more agencies do not exist".into(),
        )));
    }

    let current = find_report(&state, id).await?;
    report_status(&current)?.transition_to(ReportStatus::Routed)?;

    // The CAS in the repository re-checks the state under the row lock, so a
    // racing admin still loses cleanly.
    let (report, assignments) = ReportRepo::route(&state.pool, id, &agency_ids)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Report is not awaiting verification".into(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_REPORT_ROUTED)
            .with_source("report", report.id)
            .with_actor(admin.user_id)
            .with_payload(json!({ "agency_ids": agency_ids })),
    );

    Ok(Json(RoutedReport {
        report,
        assignments,
    }))
}

/// POST /api/v1/reports/{id}/reject
///
/// Admin rejects a report with a mandatory reason. Terminal.
pub async fn reject_report(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectReport>,
) -> AppResult<Json<Report>> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Rejection reason is required".into(),
        )));
    }

    let current = find_report(&state, id).await?;
    report_status(&current)?.transition_to(ReportStatus::Rejected)?;

    let report = ReportRepo::reject(&state.pool, id, &input.reason)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Report is already closed".into())))?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_REPORT_REJECTED)
            .with_source("report", report.id)
            .with_actor(admin.user_id)
            .with_payload(json!({ "reason": input.reason })),
    );

    Ok(Json(report))
}

/// POST /api/v1/reports/{id}/approve
///
/// Admin final approval: completes the report and credits the citizen, as
/// one transaction.
pub async fn approve_report(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApprovedReport>> {
    let current = find_report(&state, id).await?;
    report_status(&current)?.transition_to(ReportStatus::Completed)?;

    let completed =
        ReportRepo::approve_completion(&state.pool, id, state.config.completion_reward_points)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "Report is not awaiting final approval".into(),
                ))
            })?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_REPORT_COMPLETED)
            .with_source("report", completed.report.id)
            .with_actor(admin.user_id)
            .with_payload(json!({ "reward_points": completed.credit.amount })),
    );

    Ok(Json(ApprovedReport {
        report: completed.report,
        credited_points: completed.credit.amount,
    }))
}

/// GET /api/v1/reports/{id}/assignments
pub async fn list_report_assignments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Assignment>>>> {
    let report = find_report(&state, id).await?;
    ensure_report_visible(&user, &report)?;

    let assignments = AssignmentRepo::list_for_report(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignments }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_report(state: &AppState, id: DbId) -> AppResult<Report> {
    ReportRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "report",
                id,
            })
        })
}

/// Decode the stored status ID against the lifecycle enum.
fn report_status(report: &Report) -> AppResult<ReportStatus> {
    ReportStatus::from_id(report.status_id).ok_or_else(|| {
        AppError::InternalError(format!("unknown report status id {}", report.status_id))
    })
}

fn ensure_report_visible(user: &AuthUser, report: &Report) -> AppResult<()> {
    if user.role == ROLE_CITIZEN && report.citizen_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not your report".into(),
        )));
    }
    Ok(())
}
