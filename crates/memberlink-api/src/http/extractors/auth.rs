//! Session-token authentication extractors.
//!
//! The token is read from:
//! - the `token` cookie set by `POST /user/login`
//! - an `Authorization: Bearer <token>` header
//!
//! Tokens are resolved through `AccountService::authenticate`, which looks
//! up the SHA-256 hash of the token in the sessions table.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header;

use memberlink_core::service::account::require_active;
use memberlink_types::account::Account;

use crate::http::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Any logged-in account, active or not.
pub struct Authenticated(pub Account);

/// A logged-in account whose status is `active`.
pub struct ActiveAccount(pub Account);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let account = state.account_service.authenticate(&token).await?;
        Ok(Authenticated(account))
    }
}

impl FromRequestParts<AppState> for ActiveAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(account) = Authenticated::from_request_parts(parts, state).await?;
        Ok(ActiveAccount(require_active(account)?))
    }
}

/// Extract the session token from the cookie or bearer header.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(token) = cookie_value(parts, SESSION_COOKIE) {
        return Ok(token);
    }

    if let Some(auth) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(AppError::Unauthorized(
        "Please login first. Send the 'token' cookie or 'Authorization: Bearer <token>'."
            .to_string(),
    ))
}

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a freshly issued session token.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age_secs}; HttpOnly; Secure; SameSite=None"
    )
}
