//! JSON body extractor whose rejections use the API error envelope.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;

use crate::http::error::AppError;

/// `axum::Json`, but a malformed or non-JSON body becomes
/// `AppError::Validation` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
