use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Wire error codes, `E{area}{sequence}`.
///
/// - E0xxx: infrastructure
/// - E1xxx: tokens
/// - E2xxx: profile directory
/// - E8xxx: connections (interests, matches, discovery, preferences)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InternalError,
    NotFound,
    Unauthorized,

    TokenExpired,
    TokenInvalid,

    ProfileNotFound,

    CannotInteractSelf,
    MatchNotFound,
    NotMatchMember,
    InvalidPreferences,
    InvalidFeedOrder,
}

impl ErrorCode {
    const fn wire(self) -> (&'static str, StatusCode) {
        match self {
            Self::InternalError => ("E0001", StatusCode::INTERNAL_SERVER_ERROR),
            Self::NotFound => ("E0003", StatusCode::NOT_FOUND),
            Self::Unauthorized => ("E0004", StatusCode::UNAUTHORIZED),

            Self::TokenExpired => ("E1004", StatusCode::UNAUTHORIZED),
            Self::TokenInvalid => ("E1005", StatusCode::UNAUTHORIZED),

            Self::ProfileNotFound => ("E2001", StatusCode::NOT_FOUND),

            Self::CannotInteractSelf => ("E8001", StatusCode::BAD_REQUEST),
            Self::MatchNotFound => ("E8002", StatusCode::NOT_FOUND),
            Self::NotMatchMember => ("E8003", StatusCode::FORBIDDEN),
            Self::InvalidPreferences => ("E8004", StatusCode::BAD_REQUEST),
            Self::InvalidFeedOrder => ("E8005", StatusCode::BAD_REQUEST),
        }
    }

    pub fn code(&self) -> &'static str {
        self.wire().0
    }

    pub fn status_code(&self) -> StatusCode {
        self.wire().1
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A client-facing failure with a stable code.
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
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known { code, message: message.into(), details: None }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known { code, message: message.into(), details: Some(details) }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Internal(_) | AppError::Database(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status_code();

        let body = match self {
            AppError::Known { message, details, .. } => {
                if status.is_server_error() {
                    tracing::error!(code = code.code(), "{message}");
                }
                let body = ApiErrorResponse::new(code.code(), message);
                match details {
                    Some(d) => body.with_details(d),
                    None => body,
                }
            }
            // Causes are logged, never returned.
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                ApiErrorResponse::new(code.code(), "internal server error")
            }
            AppError::Database(diesel::result::Error::NotFound) => {
                ApiErrorResponse::new(code.code(), "resource not found")
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                ApiErrorResponse::new(code.code(), "database error")
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
