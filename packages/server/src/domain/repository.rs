//! メッセージストアのインターフェース
//!
//! 履歴は存在する部屋の分だけ持つ。部屋が削除されるとそのメッセージも消す。

use async_trait::async_trait;

use super::{entity::ChatMessage, error::RepositoryError, value_object::RoomName};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, message: ChatMessage) -> Result<(), RepositoryError>;

    /// `room` の直近 `limit` 件のメッセージ（古い順）
    async fn fetch_recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// `room` のメッセージを全て削除する
    async fn purge_room(&self, room: &RoomName) -> Result<(), RepositoryError>;
}
