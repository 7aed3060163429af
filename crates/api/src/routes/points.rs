//! Route definitions for the `/points` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::points;
use crate::state::AppState;

/// Routes mounted at `/points`.
///
/// ```text
/// GET /balance -> balance (citizen)
/// GET /ledger  -> ledger (citizen)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance", get(points::balance))
        .route("/ledger", get(points::ledger))
}
