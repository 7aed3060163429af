//! Route definitions for the `/rewards` and `/vouchers` resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rewards;
use crate::state::AppState;

/// Routes mounted at `/rewards`.
///
/// ```text
/// GET    /               -> list_rewards
/// POST   /               -> create_reward (admin)
/// POST   /{id}/redeem    -> redeem (citizen)
/// POST   /{id}/restock   -> restock (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rewards::list_rewards).post(rewards::create_reward))
        .route("/{id}/redeem", post(rewards::redeem))
        .route("/{id}/restock", post(rewards::restock))
}

/// Routes mounted at `/vouchers`.
///
/// ```text
/// GET    /           -> list_vouchers (citizen)
/// POST   /validate   -> validate_voucher (staff)
/// ```
pub fn voucher_router() -> Router<AppState> {
    Router::new()
        .route("/", get(rewards::list_vouchers))
        .route("/validate", post(rewards::validate_voucher))
}
