//! InMemory MessageStore 実装
//!
//! 部屋名ごとにメッセージを追記順で保持する。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageStore, RepositoryError, RoomName};

/// インメモリ MessageStore 実装
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<HashMap<RoomName, Vec<ChatMessage>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append_message(&self, message: ChatMessage) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages
            .entry(message.room.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn fetch_recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        let Some(history) = messages.get(room) else {
            return Ok(Vec::new());
        };
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }

    async fn purge_room(&self, room: &RoomName) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages.remove(room);
        Ok(())
    }
}
