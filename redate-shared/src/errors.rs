use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{domain}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: User/profile errors
/// - E2xxx: Swipe errors
/// - E3xxx: Match errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    ServiceUnavailable,
    BadRequest,
    TokenExpired,
    TokenInvalid,

    // User (E1xxx)
    UserNotFound,
    LocationRequired,
    Underage,

    // Swipe (E2xxx)
    CannotSwipeSelf,
    AlreadySwiped,
    InvalidSwipeAction,
    LikeQuotaExceeded,
    SuperLikeQuotaExceeded,
    UndoQuotaExceeded,
    NothingToUndo,

    // Match (E3xxx)
    MatchNotFound,
    ReasonRequired,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::RateLimited => "E0006",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",
            Self::TokenExpired => "E0009",
            Self::TokenInvalid => "E0010",

            // User
            Self::UserNotFound => "E1001",
            Self::LocationRequired => "E1002",
            Self::Underage => "E1003",

            // Swipe
            Self::CannotSwipeSelf => "E2001",
            Self::AlreadySwiped => "E2002",
            Self::InvalidSwipeAction => "E2003",
            Self::LikeQuotaExceeded => "E2004",
            Self::SuperLikeQuotaExceeded => "E2005",
            Self::UndoQuotaExceeded => "E2006",
            Self::NothingToUndo => "E2007",

            // Match
            Self::MatchNotFound => "E3001",
            Self::ReasonRequired => "E3002",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::CannotSwipeSelf
            | Self::InvalidSwipeAction | Self::LocationRequired | Self::Underage
            | Self::ReasonRequired => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::UserNotFound | Self::NothingToUndo
            | Self::MatchNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimited | Self::LikeQuotaExceeded | Self::SuperLikeQuotaExceeded
            | Self::UndoQuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::AlreadySwiped => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_swipe_maps_to_conflict() {
        assert_eq!(ErrorCode::AlreadySwiped.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn quota_codes_map_to_too_many_requests() {
        for code in [
            ErrorCode::LikeQuotaExceeded,
            ErrorCode::SuperLikeQuotaExceeded,
            ErrorCode::UndoQuotaExceeded,
        ] {
            assert_eq!(code.status_code(), StatusCode::TOO_MANY_REQUESTS);
        }
    }

    #[test]
    fn undo_with_empty_history_is_not_found() {
        assert_eq!(ErrorCode::NothingToUndo.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn self_swipe_is_a_validation_failure() {
        assert_eq!(ErrorCode::CannotSwipeSelf.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_codes_are_unique() {
        let codes = [
            ErrorCode::InternalError,
            ErrorCode::ValidationError,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::RateLimited,
            ErrorCode::ServiceUnavailable,
            ErrorCode::BadRequest,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::UserNotFound,
            ErrorCode::LocationRequired,
            ErrorCode::Underage,
            ErrorCode::CannotSwipeSelf,
            ErrorCode::AlreadySwiped,
            ErrorCode::InvalidSwipeAction,
            ErrorCode::LikeQuotaExceeded,
            ErrorCode::SuperLikeQuotaExceeded,
            ErrorCode::UndoQuotaExceeded,
            ErrorCode::NothingToUndo,
            ErrorCode::MatchNotFound,
            ErrorCode::ReasonRequired,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in codes {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }
}
