//! Account handlers: registration, login, profile and self-management.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse};

use memberlink_core::service::account::SESSION_TTL_DAYS;
use memberlink_types::account::{Account, AccountId, LoginRequest};

use crate::http::error::AppError;
use crate::http::extractors::json::AppJson;
use crate::http::extractors::auth::{ActiveAccount, Authenticated, session_cookie};
use crate::http::extractors::query::UserListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("invalid user id: '{raw}'")))
}

/// POST /user/register - Create an account (status defaults to `deactive`).
pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let start = Instant::now();
    let account = state.account_service.register(body).await?;
    Ok(Json(ApiResponse::success(account, start)))
}

/// POST /user/login - Verify credentials and issue a session token.
///
/// The token is returned in the body and set as the `token` cookie.
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let start = Instant::now();
    let (account, token) = state.account_service.login(body).await?;
    let cookie = session_cookie(&token, SESSION_TTL_DAYS * 24 * 60 * 60);

    let resp = ApiResponse::success(
        serde_json::json!({ "user": account, "token": token }),
        start,
    );
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(resp)))
}

/// GET /user/me - The logged-in account. Also available to deactivated accounts.
pub async fn me(
    Authenticated(account): Authenticated,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let start = Instant::now();
    Ok(Json(ApiResponse::success(account, start)))
}

/// PATCH /user/me - Update the caller's own profile or password.
pub async fn update_me(
    State(state): State<AppState>,
    ActiveAccount(caller): ActiveAccount,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let start = Instant::now();
    let account = state.account_service.update_own(&caller, body).await?;
    Ok(Json(ApiResponse::success(account, start)))
}

/// GET /user/profile/{id} - Public profile of any account.
pub async fn profile(
    State(state): State<AppState>,
    ActiveAccount(_caller): ActiveAccount,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let start = Instant::now();
    let id = parse_account_id(&id)?;
    let account = state.account_service.get_account(&id).await?;
    Ok(Json(ApiResponse::success(account, start)))
}

/// GET /users - List accounts, optionally filtered by `status` / `username`.
pub async fn list_users(
    State(state): State<AppState>,
    ActiveAccount(_caller): ActiveAccount,
    Query(query): Query<UserListQuery>,
) -> Result<Json<ApiResponse<Vec<Account>>>, AppError> {
    let start = Instant::now();
    let filter = query.into_filter()?;
    let accounts = state.account_service.list_accounts(&filter).await?;
    Ok(Json(ApiResponse::success(accounts, start)))
}

/// DELETE /user/{id} - Delete the caller's own account and its members.
pub async fn delete_user(
    State(state): State<AppState>,
    ActiveAccount(caller): ActiveAccount,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let id = parse_account_id(&id)?;
    state.account_service.delete_account(&caller, &id).await?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "message": "User deleted" }),
        start,
    )))
}
