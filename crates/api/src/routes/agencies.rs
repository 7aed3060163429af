//! Route definitions for the `/agencies` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::agencies;
use crate::state::AppState;

/// Routes mounted at `/agencies`.
///
/// ```text
/// GET    /               -> list_agencies
/// POST   /               -> create_agency (admin)
/// GET    /{id}/workers   -> list_workers (admin, own-agency supervisor)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(agencies::list_agencies).post(agencies::create_agency),
        )
        .route("/{id}/workers", get(agencies::list_workers))
}
