//! Member handlers. Every route acts on the caller's own directory.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use memberlink_types::member::{Member, MemberId};

use crate::http::error::AppError;
use crate::http::extractors::json::AppJson;
use crate::http::extractors::auth::ActiveAccount;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /member/create - Add a member to the caller's directory.
///
/// The body is validated against the member whitelist; the owner always
/// comes from the session, never from the body.
pub async fn create_member(
    State(state): State<AppState>,
    ActiveAccount(caller): ActiveAccount,
    AppJson(body): AppJson<serde_json::Value>,
) -> Result<Json<ApiResponse<Member>>, AppError> {
    let start = Instant::now();
    let member = state.member_writer.create_member(&caller.id, body).await?;
    Ok(Json(ApiResponse::success(member, start)))
}

/// GET /members - List the caller's members.
pub async fn list_members(
    State(state): State<AppState>,
    ActiveAccount(caller): ActiveAccount,
) -> Result<Json<ApiResponse<Vec<Member>>>, AppError> {
    let start = Instant::now();
    let members = state.member_lookup.list_members(&caller.id).await?;
    Ok(Json(ApiResponse::success(members, start)))
}

/// DELETE /member/{id} - Remove one of the caller's members.
pub async fn delete_member(
    State(state): State<AppState>,
    ActiveAccount(caller): ActiveAccount,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let id: MemberId = id
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid member id: '{id}'")))?;

    state.member_writer.delete_member(&id, &caller.id).await?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "message": "Member deleted" }),
        start,
    )))
}
