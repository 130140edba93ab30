//! Liveness endpoint (no auth required).

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cached_owners": state.cache.len(),
    }))
}
