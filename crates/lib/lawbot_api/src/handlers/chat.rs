//! Chat request handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ChatRequest, ChatResponse};
use crate::services::chat;

/// `POST /api/chat/` — send a message, get the model's reply.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = body.map_err(|e| {
        debug!("rejected chat body: {e}");
        AppError::Validation("Invalid request data".into())
    })?;

    let record = chat::exchange(&state, &body.message).await?;

    Ok(Json(ChatResponse {
        response: record.reply,
        message_id: record.id,
        created_at: record.created_at,
    }))
}
