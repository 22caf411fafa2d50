//! ドメインエンティティ

use super::value_object::{MessageContent, Nickname, RoomName, Timestamp};

/// レジストリが保持する部屋のレコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: RoomName,
    pub owner: Nickname,
    pub notice: String,
}

impl Room {
    /// お知らせが空の部屋を作る
    pub fn new(name: RoomName, owner: Nickname) -> Self {
        Self {
            name,
            owner,
            notice: String::new(),
        }
    }

    pub fn is_owned_by(&self, nickname: &Nickname) -> bool {
        &self.owner == nickname
    }
}

/// チャットメッセージ（ブロードキャスト・永続化の両方で使う）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: RoomName,
    pub nickname: Nickname,
    pub content: MessageContent,
    pub time: Timestamp,
}

impl ChatMessage {
    pub fn new(room: RoomName, nickname: Nickname, content: MessageContent, time: Timestamp) -> Self {
        Self {
            room,
            nickname,
            content,
            time,
        }
    }
}

/// 部屋と現在の在室人数のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub name: RoomName,
    pub owner: Nickname,
    pub notice: String,
    pub member_count: usize,
}
