use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{identity::AuthError, models::Role, policy::AccessDecision};

/// Message surfaced to the user on a failed login.
pub const INVALID_CREDENTIALS_MESSAGE: &str =
    "Invalid credentials. Use demo emails with password: demo123";

/// AppError
///
/// Every failure a handler can surface, mapped to an HTTP status and a JSON body of the form
/// `{"error": {"code": .., "message": ..}}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Required role: {required} | Your role: {actual}")]
    Forbidden { required: Role, actual: Role },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::Unavailable(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AccessDecision> for AppError {
    fn from(decision: AccessDecision) -> Self {
        match decision {
            AccessDecision::AccessDenied {
                required_role,
                actual_role,
            } => AppError::Forbidden {
                required: required_role,
                actual: actual_role,
            },
            // Only reached when there is no session to check against.
            _ => AppError::Unauthorized,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        // Internal details stay in the logs.
        let message = match &self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
