//! Health and readiness handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use arthur_models::JobId;
use arthur_store::JobStore;

use crate::state::AppState;

/// GET /health — liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /ready — readiness probe; verifies the job store is reachable.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.get(&JobId::from_string("readiness-probe")).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "detail": e.to_string() })),
        ),
    }
}
