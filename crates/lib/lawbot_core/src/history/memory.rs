//! In-memory history store.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{HistoryError, HistoryStore};
use crate::models::{ChatMessage, NewChatMessage, new_record_id};

/// Keeps records in a `Vec` behind a lock. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<ChatMessage>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, new: NewChatMessage) -> Result<ChatMessage, HistoryError> {
        let record = ChatMessage {
            id: new_record_id(),
            message: new.message().to_string(),
            reply: new.reply().to_string(),
            created_at: Utc::now(),
        };
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<ChatMessage>, HistoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<ChatMessage>, HistoryError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn count(&self) -> Result<i64, HistoryError> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_then_get_returns_identical_record() {
        let store = MemoryHistoryStore::new();
        let new = NewChatMessage::new("What is a tort?", "A civil wrong.").unwrap();

        let stored = store.append(new).await.unwrap();
        let fetched = store.get(&stored.id).await.unwrap().expect("record exists");

        assert_eq!(stored, fetched);
        assert_eq!(fetched.message, "What is a tort?");
        assert_eq!(fetched.reply, "A civil wrong.");
    }

    #[tokio::test]
    async fn list_is_oldest_first() {
        let store = MemoryHistoryStore::new();
        for i in 0..3 {
            let new = NewChatMessage::new(format!("q{i}"), format!("a{i}")).unwrap();
            store.append(new).await.unwrap();
        }

        let all = store.list().await.unwrap();
        let messages: Vec<_> = all.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["q0", "q1", "q2"]);
        assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let store = MemoryHistoryStore::new();
        assert!(store.get(&Uuid::now_v7()).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.ping().await);
    }
}
