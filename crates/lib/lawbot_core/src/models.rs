//! Chat history domain models.
//!
//! These are internal domain models, distinct from the API response models
//! in `lawbot_api` (which carry `#[serde(rename)]` for camelCase etc.).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::history::HistoryError;

/// Replies longer than this many characters are truncated before storage.
pub const MAX_REPLY_CHARS: usize = 5000;

/// Marker appended to a truncated reply.
const TRUNCATION_MARKER: &str = "...";

/// A persisted chat exchange. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    /// What the user typed.
    pub message: String,
    /// What the completion API answered.
    pub reply: String,
    pub created_at: DateTime<Utc>,
}

/// A validated exchange waiting to be appended to the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    message: String,
    reply: String,
}

impl NewChatMessage {
    /// Validates and normalizes an exchange.
    ///
    /// Both sides must contain non-whitespace text. Replies over
    /// [`MAX_REPLY_CHARS`] are cut down to fit, ending in `"..."`.
    pub fn new(message: impl Into<String>, reply: impl Into<String>) -> Result<Self, HistoryError> {
        let message = message.into();
        let reply = reply.into();

        if message.trim().is_empty() {
            return Err(HistoryError::Validation(
                "message content cannot be empty".into(),
            ));
        }
        if reply.trim().is_empty() {
            return Err(HistoryError::Validation(
                "reply content cannot be empty".into(),
            ));
        }

        Ok(Self {
            message,
            reply: truncate_reply(reply),
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }
}

fn truncate_reply(reply: String) -> String {
    let len = reply.chars().count();
    if len <= MAX_REPLY_CHARS {
        return reply;
    }

    warn!(
        original_chars = len,
        max_chars = MAX_REPLY_CHARS,
        "reply truncated before storage"
    );
    let keep = MAX_REPLY_CHARS - TRUNCATION_MARKER.len();
    let mut truncated: String = reply.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Generate a new record ID.
///
/// UUIDv7 embeds a timestamp, so IDs sort in insertion order alongside
/// `created_at`.
pub fn new_record_id() -> Uuid {
    Uuid::now_v7()
}

/// First `max` characters of `text`, for log lines.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}
