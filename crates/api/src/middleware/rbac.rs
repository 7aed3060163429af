//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement. Use these in route handlers to enforce authorization
//! at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use civitrack_core::error::CoreError;
use civitrack_core::roles::{
    ROLE_ADMIN, ROLE_AGENCY_SUPERVISOR, ROLE_CITIZEN, ROLE_FIELD_WORKER,
};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

fn forbidden(requirement: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(format!("{requirement} role required")))
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user is guaranteed to be an admin here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(forbidden("Admin"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires the `citizen` role.
pub struct RequireCitizen(pub AuthUser);

impl FromRequestParts<AppState> for RequireCitizen {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_CITIZEN {
            return Err(forbidden("Citizen"));
        }
        Ok(RequireCitizen(user))
    }
}

/// Requires the `agency_supervisor` role.
pub struct RequireSupervisor(pub AuthUser);

impl FromRequestParts<AppState> for RequireSupervisor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_AGENCY_SUPERVISOR {
            return Err(forbidden("Agency supervisor"));
        }
        Ok(RequireSupervisor(user))
    }
}

/// Requires the `field_worker` role.
pub struct RequireWorker(pub AuthUser);

impl FromRequestParts<AppState> for RequireWorker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_FIELD_WORKER {
            return Err(forbidden("Field worker"));
        }
        Ok(RequireWorker(user))
    }
}

/// Requires agency staff (`agency_supervisor` or `field_worker`) or `admin`.
///
/// Used for operations performed at a partner desk, e.g. voucher validation.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role == ROLE_CITIZEN {
            return Err(forbidden("Staff"));
        }
        Ok(RequireStaff(user))
    }
}
