//! ブロードキャストの宛先解決とプレゼンスのスナップショット
//!
//! スナップショットは呼び出しのたびにセッション表から計算し、キャッシュしない。

use super::{
    effect::Effect,
    event::{RoomUserCount, ServerEvent},
    hub::ChatHub,
    value_object::{ConnectionId, Nickname, RoomName},
};

impl ChatHub {
    /// `room` に所属する全ての接続へ `event` を届ける
    pub fn to_room(&self, room: &RoomName, event: ServerEvent) -> Effect {
        Effect::Deliver {
            recipients: self.members(room).map(|(connection, _)| connection).collect(),
            event,
        }
    }

    /// 1 つの接続へ `event` を届ける
    pub fn to_connection(&self, connection: ConnectionId, event: ServerEvent) -> Effect {
        Effect::Unicast { connection, event }
    }

    /// 部屋への所属に関わらず、開いている全ての接続へ `event` を届ける
    pub fn to_all(&self, event: ServerEvent) -> Effect {
        Effect::Deliver {
            recipients: self.sessions.keys().copied().collect(),
            event,
        }
    }

    /// `room` に所属するニックネーム一覧（表示が安定するようソート済み）
    pub fn presence_snapshot(&self, room: &RoomName) -> Vec<Nickname> {
        let mut users: Vec<Nickname> = self
            .members(room)
            .map(|(_, nickname)| nickname.clone())
            .collect();
        users.sort();
        users
    }

    /// 各部屋の在室人数（レジストリの順）
    pub fn room_counts_snapshot(&self) -> Vec<RoomUserCount> {
        self.registry
            .names()
            .map(|name| RoomUserCount {
                name: name.clone(),
                count: self.member_count(name),
            })
            .collect()
    }

    /// `room` のメンバー向けの `users` イベント
    pub fn presence_update(&self, room: &RoomName) -> Effect {
        self.to_room(
            room,
            ServerEvent::Users {
                users: self.presence_snapshot(room),
            },
        )
    }

    /// 全接続向けの `room_user_counts` イベント
    pub fn room_counts_update(&self) -> Effect {
        self.to_all(ServerEvent::RoomUserCounts {
            counts: self.room_counts_snapshot(),
        })
    }
}
