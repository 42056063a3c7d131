use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::utils::calendar::CalendarError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `UNAUTHENTICATED`, `TOKEN_INVALID`,
    /// `PERMISSION_DENIED`, `INVALID_REQUEST`, `NOT_FOUND`, `CHALLENGE_EXPIRED`,
    /// `DUPLICATE_SUBMISSION`, `BUY_IN_REQUIRED`, `USERNAME_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "BUY_IN_REQUIRED")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Buy-in required before midnight to participate")]
    pub message: String,
}

/// Application-level error type.
///
/// Every variant except `StorageFailure` is caused by the client and is
/// reported verbatim.
#[derive(Debug)]
pub enum AppError {
    Unauthenticated,
    TokenInvalid,
    PermissionDenied,
    InvalidRequest(String),
    NotFound(String),
    /// The challenge window closed before the submission arrived.
    Expired,
    DuplicateSubmission,
    /// No buy-in recorded for the previous UTC day.
    BuyInRequired,
    UsernameTaken,
    /// Transaction or IO failure. Detail is logged, never returned.
    StorageFailure(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Expired => "CHALLENGE_EXPIRED",
            AppError::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            AppError::BuyInRequired => "BUY_IN_REQUIRED",
            AppError::UsernameTaken => "USERNAME_TAKEN",
            AppError::StorageFailure(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied | AppError::BuyInRequired => StatusCode::FORBIDDEN,
            AppError::InvalidRequest(_) | AppError::Expired => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateSubmission | AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            AppError::Unauthenticated => "Authentication required".into(),
            AppError::TokenInvalid => "Invalid or expired token".into(),
            AppError::PermissionDenied => "Insufficient permissions".into(),
            AppError::InvalidRequest(msg) | AppError::NotFound(msg) => msg,
            AppError::Expired => "Challenge has expired".into(),
            AppError::DuplicateSubmission => "You have already submitted for this challenge".into(),
            AppError::BuyInRequired => "Buy-in required before midnight to participate".into(),
            AppError::UsernameTaken => "Username is already taken".into(),
            AppError::StorageFailure(detail) => {
                tracing::error!("Storage failure: {}", detail);
                "An unexpected error occurred".into()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::StorageFailure(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { limit, .. } => {
                AppError::InvalidRequest(format!("File exceeds maximum size of {limit} bytes"))
            }
            StorageError::NotFound(_) => AppError::NotFound("Media not found".into()),
            other => AppError::StorageFailure(other.to_string()),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}
