//! 所属とオーナーのエンジン
//!
//! 所属は単独では保存せず、必要なたびにセッション表から導く。
//! 参加と退出のたびにオーナー在室チェックを行い、退出時はその後に空室チェックも行う。

use super::{
    effect::Effect,
    event::ServerEvent,
    hub::{Binding, ChatHub, SessionState},
    value_object::{ConnectionId, Nickname, RoomName},
};

impl ChatHub {
    /// `room` に所属する接続とニックネーム（順序は不定）
    pub fn members<'a>(
        &'a self,
        room: &'a RoomName,
    ) -> impl Iterator<Item = (ConnectionId, &'a Nickname)> + 'a {
        self.sessions
            .iter()
            .filter_map(move |(connection, state)| match state {
                SessionState::Joined(binding) if &binding.room == room => {
                    Some((*connection, &binding.nickname))
                }
                _ => None,
            })
    }

    pub fn member_count(&self, room: &RoomName) -> usize {
        self.members(room).count()
    }

    /// `room` に所属している `nickname` の接続
    pub fn connection_of(&self, room: &RoomName, nickname: &Nickname) -> Option<ConnectionId> {
        self.members(room)
            .find(|(_, member)| *member == nickname)
            .map(|(connection, _)| connection)
    }

    /// `connection` を `room` に所属させる。部屋が無ければ自動作成する
    ///
    /// ニックネームはディレクトリに登録済みであること。
    pub(super) fn join(
        &mut self,
        connection: ConnectionId,
        nickname: Nickname,
        room: RoomName,
    ) -> Vec<Effect> {
        if self.registry.get_or_auto_create(&room) {
            tracing::info!("Room '{}' auto-created on join by '{}'", room, nickname);
        }
        tracing::info!("'{}' joined room '{}'", nickname, room);
        self.sessions.insert(
            connection,
            SessionState::Joined(Binding {
                nickname,
                room: room.clone(),
            }),
        );

        let mut effects = self.check_owner_presence(&room);
        effects.push(self.presence_update(&room));
        effects.push(self.room_counts_update());
        effects.push(Effect::ReplayHistory {
            connection,
            room: room.clone(),
        });
        if let Some(notice) = self
            .registry
            .get(&room)
            .map(|record| record.notice.clone())
            .filter(|notice| !notice.is_empty())
        {
            effects.push(self.to_connection(connection, ServerEvent::Notice { room, notice }));
        }
        effects
    }

    /// `connection` を部屋から外す。セッションは [`SessionState::Connected`] に戻り、
    /// ディレクトリの登録は残る
    ///
    /// 外した紐づけを返す。参加していなければ `None`
    pub(super) fn leave(&mut self, connection: ConnectionId) -> Option<(Binding, Vec<Effect>)> {
        let binding = self.binding(&connection)?.clone();
        self.sessions.insert(connection, SessionState::Connected);
        tracing::info!("'{}' left room '{}'", binding.nickname, binding.room);

        // オーナーチェックが先。オーナー不在と空室が同時に起きた部屋は候補が見つからず、
        // owner_changed 無しで削除される
        let mut effects = self.check_owner_presence(&binding.room);
        effects.extend(self.check_empty(&binding.room));
        if self.registry.contains(&binding.room) {
            effects.push(self.presence_update(&binding.room));
        }
        Some((binding, effects))
    }

    /// 記録上のオーナーが `room` に居なければ、新しいオーナーを選び直す
    ///
    /// 後任は最初に見つかったメンバーで、候補間の順序は保証しない。
    pub fn check_owner_presence(&mut self, room: &RoomName) -> Vec<Effect> {
        if self.registry.is_default(room) {
            return Vec::new();
        }
        let Some(owner) = self.registry.get(room).map(|record| record.owner.clone()) else {
            return Vec::new();
        };
        if self.connection_of(room, &owner).is_some() {
            tracing::debug!("Owner '{}' of room '{}' is present", owner, room);
            return Vec::new();
        }

        let Some(new_owner) = self.members(room).map(|(_, nickname)| nickname.clone()).next()
        else {
            tracing::warn!(
                "Owner '{}' left room '{}' and no member remains to take over",
                owner,
                room
            );
            return Vec::new();
        };
        self.registry.set_owner(room, new_owner.clone());
        tracing::info!(
            "Ownership of room '{}' passed from '{}' to '{}'",
            room,
            owner,
            new_owner
        );
        vec![self.to_room(
            room,
            ServerEvent::OwnerChanged {
                room: room.clone(),
                new_owner,
            },
        )]
    }

    /// 誰も所属していなければ `room` を削除する
    pub fn check_empty(&mut self, room: &RoomName) -> Vec<Effect> {
        if self.registry.is_default(room) || self.member_count(room) > 0 {
            return Vec::new();
        }
        match self.registry.remove(room) {
            Some(_) => {
                tracing::info!("Room '{}' is empty and was removed", room);
                vec![Effect::PurgeHistory(room.clone())]
            }
            None => Vec::new(),
        }
    }

    /// `nickname` がオーナーのデフォルト以外の部屋を、他のメンバーの有無に関わらず全て削除する
    /// メンバーには先に `room_deleted` を送る
    pub fn cascade_owner_logout(&mut self, nickname: &Nickname) -> Vec<Effect> {
        let mut effects = Vec::new();
        for room in self.registry.owned_by(nickname) {
            effects.push(self.to_room(&room, ServerEvent::RoomDeleted { room: room.clone() }));
            self.registry.remove(&room);
            effects.push(Effect::PurgeHistory(room.clone()));
            tracing::info!(
                "Room '{}' deleted because its owner '{}' logged out",
                room,
                nickname
            );
        }
        effects
    }
}
