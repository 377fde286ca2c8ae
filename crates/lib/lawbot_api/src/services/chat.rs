//! Chat exchange — validate, ask the completion API, record the result.

use tracing::{info, warn};

use lawbot_core::completion::NOT_CONFIGURED_MESSAGE;
use lawbot_core::models::{ChatMessage, NewChatMessage, preview};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Longest accepted chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Characters of user text included in log lines.
const LOG_PREVIEW_CHARS: usize = 50;

/// Trim `raw` and check it is 1..=[`MAX_MESSAGE_CHARS`] characters.
pub fn validate_message(raw: &str) -> AppResult<&str> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(AppError::Validation("No message provided".into()));
    }
    let len = message.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message is too long ({len} characters, maximum {MAX_MESSAGE_CHARS})"
        )));
    }
    Ok(message)
}

/// Run one exchange and return the stored record.
///
/// Nothing is written unless the completion API returns a reply.
pub async fn exchange(state: &AppState, raw: &str) -> AppResult<ChatMessage> {
    let message = validate_message(raw)?;
    info!(
        message = %preview(message, LOG_PREVIEW_CHARS),
        "chat message received"
    );

    if !state.completion.is_configured() {
        warn!("chat rejected: no completion API key configured");
        return Err(AppError::NotConfigured(NOT_CONFIGURED_MESSAGE.into()));
    }

    let reply = state.completion.complete(message).await.map_err(|e| {
        warn!(kind = e.kind(), error = %e, "completion request failed");
        AppError::from(e)
    })?;

    let record = state
        .history
        .append(NewChatMessage::new(message, reply)?)
        .await?;

    match state.history.count().await {
        Ok(total) => info!(id = %record.id, total, "chat record stored"),
        Err(e) => warn!(id = %record.id, "chat record stored; count failed: {e}"),
    }

    Ok(record)
}
