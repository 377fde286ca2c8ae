//! PostgreSQL-backed history store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{HistoryError, HistoryStore};
use crate::models::{ChatMessage, NewChatMessage, new_record_id};

/// History store over a shared `PgPool`.
#[derive(Debug, Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, new: NewChatMessage) -> Result<ChatMessage, HistoryError> {
        let row = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, message, reply)
            VALUES ($1, $2, $3)
            RETURNING id, message, reply, created_at
            "#,
        )
        .bind(new_record_id())
        .bind(new.message())
        .bind(new.reply())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list(&self) -> Result<Vec<ChatMessage>, HistoryError> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, message, reply, created_at
            FROM chat_messages
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<ChatMessage>, HistoryError> {
        let row = sqlx::query_as::<_, ChatMessage>(
            "SELECT id, message, reply, created_at FROM chat_messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn count(&self) -> Result<i64, HistoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
