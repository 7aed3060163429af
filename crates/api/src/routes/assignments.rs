//! Route definitions for the `/assignments` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assignments;
use crate::state::AppState;

/// Routes mounted at `/assignments`.
///
/// ```text
/// GET    /                  -> list_for_agency (supervisor)
/// GET    /unassignable      -> list_unassignable (admin)
/// POST   /{id}/assign       -> assign_worker (supervisor)
/// POST   /{id}/start        -> start_work (worker)
/// GET    /{id}/executions   -> list_executions
/// POST   /{id}/executions   -> log_execution (worker)
/// POST   /{id}/approve      -> approve (supervisor)
/// POST   /{id}/return       -> return_for_revision (supervisor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assignments::list_for_agency))
        .route("/unassignable", get(assignments::list_unassignable))
        .route("/{id}/assign", post(assignments::assign_worker))
        .route("/{id}/start", post(assignments::start_work))
        .route(
            "/{id}/executions",
            get(assignments::list_executions).post(assignments::log_execution),
        )
        .route("/{id}/approve", post(assignments::approve))
        .route("/{id}/return", post(assignments::return_for_revision))
}
