//! Route definitions for the `/reports` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET    /                  -> list_reports
/// POST   /                  -> submit_report (citizen)
/// GET    /{id}              -> get_report
/// POST   /{id}/route        -> route_report (admin)
/// POST   /{id}/reject       -> reject_report (admin)
/// POST   /{id}/approve      -> approve_report (admin)
/// GET    /{id}/assignments  -> list_report_assignments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reports::list_reports).post(reports::submit_report))
        .route("/{id}", get(reports::get_report))
        .route("/{id}/route", post(reports::route_report))
        .route("/{id}/reject", post(reports::reject_report))
        .route("/{id}/approve", post(reports::approve_report))
        .route("/{id}/assignments", get(reports::list_report_assignments))
}
