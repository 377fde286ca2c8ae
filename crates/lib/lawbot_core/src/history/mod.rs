//! Chat history persistence.
//!
//! The history is an append-only log of successful exchanges. Two stores
//! implement [`HistoryStore`]:
//!
//! - [`PgHistoryStore`] — PostgreSQL via `sqlx`, used in production
//! - [`MemoryHistoryStore`] — process-local, for tests and `--in-memory` runs

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChatMessage, NewChatMessage};

pub use memory::MemoryHistoryStore;
pub use postgres::PgHistoryStore;

/// Errors that can occur reading or writing the history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Append-only store of chat records.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a new record stamped with the current time.
    async fn append(&self, new: NewChatMessage) -> Result<ChatMessage, HistoryError>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Fetch a single record by ID.
    async fn get(&self, id: &Uuid) -> Result<Option<ChatMessage>, HistoryError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<i64, HistoryError>;

    /// Whether the backing store is reachable.
    async fn ping(&self) -> bool;
}
