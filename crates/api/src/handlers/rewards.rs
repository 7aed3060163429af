//! Handlers for the `/rewards` and `/vouchers` resources: catalog
//! management, atomic redemption, and one-shot voucher validation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use civitrack_core::error::CoreError;
use civitrack_core::redemption::is_well_formed_code;
use civitrack_core::types::DbId;
use civitrack_db::models::reward::{CreateRewardItem, RewardItem};
use civitrack_db::models::voucher::{ValidateVoucher, Voucher};
use civitrack_db::repositories::{RedemptionRepo, RewardRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireCitizen, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /rewards`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRewardPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub partner: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub cost_points: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
}

/// Request body for `POST /rewards/{id}/restock`.
#[derive(Debug, Deserialize, Validate)]
pub struct RestockPayload {
    #[validate(range(min = 1))]
    pub additional: i32,
}

// ---------------------------------------------------------------------------
// Reward catalog
// ---------------------------------------------------------------------------

/// GET /api/v1/rewards
pub async fn list_rewards(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<RewardItem>>>> {
    let items = RewardRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/rewards (admin)
pub async fn create_reward(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(input): Json<CreateRewardPayload>,
) -> AppResult<(StatusCode, Json<RewardItem>)> {
    input.validate()?;

    let item = RewardRepo::create(
        &state.pool,
        &CreateRewardItem {
            name: input.name,
            partner: input.partner,
            description: input.description,
            cost_points: input.cost_points,
            stock: input.stock,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /api/v1/rewards/{id}/restock (admin)
pub async fn restock(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RestockPayload>,
) -> AppResult<Json<RewardItem>> {
    input.validate()?;

    let item = RewardRepo::restock(&state.pool, id, input.additional)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "reward item",
                id,
            })
        })?;
    Ok(Json(item))
}

// ---------------------------------------------------------------------------
// Redemption and vouchers
// ---------------------------------------------------------------------------

/// POST /api/v1/rewards/{id}/redeem (citizen)
///
/// Atomically exchanges points for the item; policy failures (insufficient
/// points, out of stock) leave no mutation behind.
pub async fn redeem(
    State(state): State<AppState>,
    RequireCitizen(user): RequireCitizen,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Voucher>)> {
    let voucher = RedemptionRepo::redeem(&state.pool, user.user_id, id).await?;
    tracing::info!(citizen_id = user.user_id, item_id = id, "Reward redeemed");
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/v1/vouchers (citizen)
pub async fn list_vouchers(
    State(state): State<AppState>,
    RequireCitizen(user): RequireCitizen,
) -> AppResult<Json<DataResponse<Vec<Voucher>>>> {
    let vouchers = RedemptionRepo::list_for_citizen(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: vouchers }))
}

/// POST /api/v1/vouchers/validate (staff)
///
/// Marks the voucher used, exactly once. A second attempt yields 409
/// `ALREADY_USED`; an unknown code yields 404.
pub async fn validate_voucher(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
    Json(input): Json<ValidateVoucher>,
) -> AppResult<Json<Voucher>> {
    if !is_well_formed_code(&input.code) {
        return Err(AppError::Core(CoreError::Validation(
            "Malformed voucher code".into(),
        )));
    }

    let voucher = RedemptionRepo::validate(&state.pool, &input.code).await?;
    Ok(Json(voucher))
}
