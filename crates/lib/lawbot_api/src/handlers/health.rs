//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::AppState;
use crate::error::AppResult;
use crate::models::HealthResponse;

/// `GET /api/health` — verifies the history store and reports configuration.
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let db_connected = state.history.ping().await;

    let message_count = if db_connected {
        match state.history.count().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("history count failed: {e}");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: if db_connected { "ok" } else { "degraded" }.to_string(),
        version: lawbot_core::version().to_string(),
        db_connected,
        message_count,
        completion_configured: state.completion.is_configured(),
    }))
}
