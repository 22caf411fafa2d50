//! チャットの共有状態を全て持つ直列化ドメイン

use std::collections::HashMap;

use super::{
    directory::Directory,
    registry::RoomRegistry,
    value_object::{ConnectionId, Nickname, RoomName},
};

/// 参加中の接続が紐づくニックネームと部屋
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub nickname: Nickname,
    pub room: RoomName,
}

/// 接続ごとの状態。セッション表に無い接続は終了済み
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// トランスポートは開いているが、まだニックネームを登録していない
    Connected,
    Joined(Binding),
}

/// ディレクトリ・部屋のレジストリ・セッション表をまとめて更新する
///
/// ハブはちょうど 1 つのロック（またはタスク）が所有する。
/// 公開している操作は全て、3 つの構造を互いに矛盾しない状態で終える。
#[derive(Debug)]
pub struct ChatHub {
    pub(super) directory: Directory,
    pub(super) registry: RoomRegistry,
    pub(super) sessions: HashMap<ConnectionId, SessionState>,
}

impl ChatHub {
    pub fn new(default_room: RoomName) -> Self {
        Self {
            directory: Directory::new(),
            registry: RoomRegistry::new(default_room),
            sessions: HashMap::new(),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn default_room(&self) -> &RoomName {
        self.registry.default_room()
    }

    /// 新しく開いたトランスポート接続を登録する
    pub fn connect(&mut self, connection: ConnectionId) {
        self.sessions.insert(connection, SessionState::Connected);
    }

    pub fn session(&self, connection: &ConnectionId) -> Option<&SessionState> {
        self.sessions.get(connection)
    }

    pub fn binding(&self, connection: &ConnectionId) -> Option<&Binding> {
        match self.sessions.get(connection) {
            Some(SessionState::Joined(binding)) => Some(binding),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// 生の room フィールドから参加先の部屋を決める。空や未指定ならデフォルトルーム
    pub(super) fn resolve_join_room(&self, room: Option<&str>) -> RoomName {
        room.and_then(RoomName::lenient)
            .unwrap_or_else(|| self.default_room().clone())
    }
}
