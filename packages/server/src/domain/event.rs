//! クライアントとやり取りするアプリケーションレベルのメッセージ

use super::{
    entity::ChatMessage,
    value_object::{Nickname, RoomName},
};

/// サーバーから接続へ送るイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// 参加した部屋の直近のメッセージ（古い順）
    History { entries: Vec<ChatMessage> },
    Chat(ChatMessage),
    /// 部屋の在室者一覧
    Users { users: Vec<Nickname> },
    Notice { room: RoomName, notice: String },
    Kicked { room: RoomName },
    RoomDeleted { room: RoomName },
    OwnerChanged { room: RoomName, new_owner: Nickname },
    RoomUserCounts { counts: Vec<RoomUserCount> },
    LoginError { error: String },
}

impl ServerEvent {
    /// イベントのワイヤ上のタグ（ログ用）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::History { .. } => "history",
            Self::Chat(_) => "chat",
            Self::Users { .. } => "users",
            Self::Notice { .. } => "notice",
            Self::Kicked { .. } => "kicked",
            Self::RoomDeleted { .. } => "room_deleted",
            Self::OwnerChanged { .. } => "owner_changed",
            Self::RoomUserCounts { .. } => "room_user_counts",
            Self::LoginError { .. } => "login_error",
        }
    }
}

/// 1 部屋分の在室人数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomUserCount {
    pub name: RoomName,
    pub count: usize,
}

/// クライアントが送るメッセージ（ワイヤ形式からデコード済み）
///
/// フィールドは生のまま持つ。検証はハブの中で行い、トランスポートに関わらず
/// 同じ形で失敗を返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Login {
        nickname: String,
        room: Option<String>,
    },
    Chat {
        content: String,
    },
    Logout,
    /// 参加中のセッションを別の部屋へ移す
    Join {
        room: Option<String>,
    },
    /// サーバーが知らない種類のメッセージ。無視する
    Unknown,
}
