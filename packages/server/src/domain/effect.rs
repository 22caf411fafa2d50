//! ハブの 1 回の操作が生む副作用

use super::{
    entity::ChatMessage,
    event::ServerEvent,
    value_object::{ConnectionId, RoomName},
};

/// ハブの状態が変わった後に外側の層が実行する処理
///
/// 宛先はハブのロック中に解決されるので、配送は常にイベント生成時点の所属を反映する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 1 つのイベントを複数の接続へ配る
    Deliver {
        recipients: Vec<ConnectionId>,
        event: ServerEvent,
    },
    /// 1 つの接続への直接の応答
    Unicast {
        connection: ConnectionId,
        event: ServerEvent,
    },
    AppendMessage(ChatMessage),
    PurgeHistory(RoomName),
    /// `room` の直近の履歴を `connection` へ送る
    ReplayHistory {
        connection: ConnectionId,
        room: RoomName,
    },
    /// 接続が終了状態になった。送信チャンネルを破棄する
    Close(ConnectionId),
}

impl Effect {
    /// 配送されるイベント（あれば）
    pub fn event(&self) -> Option<&ServerEvent> {
        match self {
            Self::Deliver { event, .. } | Self::Unicast { event, .. } => Some(event),
            _ => None,
        }
    }

    /// この副作用で `connection` が `event` を受け取るかどうか
    pub fn reaches(&self, connection: &ConnectionId) -> bool {
        match self {
            Self::Deliver { recipients, .. } => recipients.contains(connection),
            Self::Unicast {
                connection: target,
                ..
            } => target == connection,
            _ => false,
        }
    }
}
