//! Handlers for the `/agencies` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use civitrack_core::error::CoreError;
use civitrack_core::roles::ROLE_AGENCY_SUPERVISOR;
use civitrack_core::types::DbId;
use civitrack_db::models::agency::{Agency, CreateAgency};
use civitrack_db::models::user::User;
use civitrack_db::repositories::{AgencyRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /agencies`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgencyPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

/// POST /api/v1/agencies (admin)
pub async fn create_agency(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Json(input): Json<CreateAgencyPayload>,
) -> AppResult<(StatusCode, Json<Agency>)> {
    input.validate()?;

    // uq_agencies_name violations surface as 409.
    let agency = AgencyRepo::create(
        &state.pool,
        &CreateAgency {
            name: input.name,
            category: input.category,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(agency)))
}

/// GET /api/v1/agencies
pub async fn list_agencies(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Agency>>>> {
    let agencies = AgencyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: agencies }))
}

/// GET /api/v1/agencies/{id}/workers
///
/// Active field workers of an agency, least-loaded first. Admins may query
/// any agency; supervisors only their own.
pub async fn list_workers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    if user.role == ROLE_AGENCY_SUPERVISOR {
        let me = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
            })?;
        if me.agency_id != Some(id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Not your agency".into(),
            )));
        }
    } else if user.role != civitrack_core::roles::ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin or agency supervisor role required".into(),
        )));
    }

    AgencyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "agency",
                id,
            })
        })?;

    let workers = UserRepo::list_active_workers(&state.pool, id).await?;
    Ok(Json(DataResponse { data: workers }))
}
