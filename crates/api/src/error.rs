use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use civitrack_core::error::CoreError;
use civitrack_core::redemption::{RedemptionError, VoucherValidationError};
use civitrack_core::status::IllegalTransition;
use civitrack_db::repositories::{RedeemError, ValidateError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `civitrack_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A state-machine edge that the transition tables do not allow.
    #[error(transparent)]
    Transition(#[from] IllegalTransition),

    /// A redemption failure (policy outcome or infrastructure).
    #[error(transparent)]
    Redeem(#[from] RedeemError),

    /// A voucher validation failure.
    #[error(transparent)]
    VoucherValidate(#[from] ValidateError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Redemption policy outcomes (expected, no mutation made) ---
            AppError::Redeem(err) => match err {
                RedeemError::Policy(RedemptionError::InsufficientPoints { balance, cost }) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INSUFFICIENT_POINTS",
                    format!("Balance {balance} is below the item cost {cost}"),
                ),
                RedeemError::Policy(RedemptionError::OutOfStock) => (
                    StatusCode::CONFLICT,
                    "OUT_OF_STOCK",
                    "This reward item is out of stock".to_string(),
                ),
                RedeemError::ItemNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("reward item with id {id} not found"),
                ),
                RedeemError::Database(db) => classify_sqlx_error(db),
            },

            AppError::VoucherValidate(err) => match err {
                ValidateError::Policy(VoucherValidationError::AlreadyUsed) => (
                    StatusCode::CONFLICT,
                    "ALREADY_USED",
                    "This voucher has already been used".to_string(),
                ),
                ValidateError::Policy(VoucherValidationError::UnknownCode) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    "Unknown voucher code".to_string(),
                ),
                ValidateError::Database(db) => classify_sqlx_error(db),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Illegal state-machine transitions ---
            AppError::Transition(err) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
