//! Provider webhook receiver.

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::generations::GenerationResponse;
use crate::state::AppState;

/// POST /api/webhooks/:provider
///
/// Receive a push notification from a generation provider. The payload
/// is normalized by the named provider's adapter and applied with the
/// same idempotency rules as polling.
///
/// Returns:
/// - 200: Updated job
/// - 404: Unknown provider, or payload does not identify a known job
pub async fn provider_webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> ApiResult<Json<GenerationResponse>> {
    info!("provider_webhook provider={}", provider);

    let job = state.tracker.receive_webhook(&provider, payload).await?;

    Ok(Json(job.into()))
}
