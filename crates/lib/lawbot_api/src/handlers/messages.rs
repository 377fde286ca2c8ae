//! Read-only access to stored chat records.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::ChatMessageResponse;

/// `GET /api/messages/` — all records, oldest first.
pub async fn list_messages_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ChatMessageResponse>>> {
    let records = state.history.list().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// `GET /api/messages/{id}` — one record.
pub async fn get_message_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ChatMessageResponse>> {
    let id: Uuid = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid message ID: {id}")))?;

    let record = state
        .history
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Message not found: {id}")))?;

    Ok(Json(record.into()))
}
