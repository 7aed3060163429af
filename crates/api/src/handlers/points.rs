//! Handlers for the `/points` resource: derived balance and ledger history.

use axum::extract::State;
use axum::Json;
use civitrack_db::models::points::{Balance, LedgerEntry};
use civitrack_db::repositories::PointsRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireCitizen;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/points/balance (citizen)
///
/// The balance is always derived from the ledger, never stored.
pub async fn balance(
    State(state): State<AppState>,
    RequireCitizen(user): RequireCitizen,
) -> AppResult<Json<Balance>> {
    let balance = PointsRepo::balance(&state.pool, user.user_id).await?;
    Ok(Json(Balance {
        citizen_id: user.user_id,
        balance,
    }))
}

/// GET /api/v1/points/ledger (citizen)
pub async fn ledger(
    State(state): State<AppState>,
    RequireCitizen(user): RequireCitizen,
) -> AppResult<Json<DataResponse<Vec<LedgerEntry>>>> {
    let entries = PointsRepo::list_for_citizen(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
