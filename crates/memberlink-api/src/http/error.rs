//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use memberlink_types::error::{AccountError, MemberError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Member(MemberError),
    Account(AccountError),
    /// Authentication failure before any service was reached.
    Unauthorized(String),
    /// Malformed path or query input.
    Validation(String),
}

impl From<MemberError> for AppError {
    fn from(e: MemberError) -> Self {
        AppError::Member(e)
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        AppError::Account(e)
    }
}

impl AppError {
    /// Status, machine-readable code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Member(MemberError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Member(MemberError::NotFound) => (
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_FOUND",
                "Member not found".to_string(),
            ),
            AppError::Member(MemberError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "MEMBER_CONFLICT", msg.clone())
            }
            AppError::Member(MemberError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Internal storage error".to_string(),
            ),
            AppError::Account(AccountError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Account(AccountError::NotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::Account(AccountError::Unauthorized) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Please login first".to_string(),
            ),
            AppError::Account(AccountError::InvalidCredentials) => (
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            AppError::Account(AccountError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "USER_CONFLICT", msg.clone())
            }
            AppError::Account(AccountError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Internal storage error".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // Storage details stay in the logs, never in the response body.
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
