//! オーナーだけが行える部屋の管理操作
//!
//! これらはセッションではなく管理 API から呼ばれるため、
//! 要求者はただのニックネームで、与えられたまま信用する。

use super::{
    effect::Effect,
    entity::RoomSummary,
    error::{DirectoryError, RoomError},
    event::ServerEvent,
    hub::ChatHub,
    value_object::{Nickname, RoomName},
};

impl ChatHub {
    /// `creator` がオーナーの部屋を作る。名前は厳密に検証する
    pub fn create_room(&mut self, name: &str, creator: &Nickname) -> Result<Vec<Effect>, RoomError> {
        let room = self.registry.create(name, creator.clone())?;
        tracing::info!("Room '{}' created by '{}'", room, creator);
        Ok(vec![self.room_counts_update()])
    }

    /// オーナーによる明示的な削除。部屋が消える前にメンバーへ通知する
    pub fn delete_room(&mut self, name: &str, requester: &Nickname) -> Result<Vec<Effect>, RoomError> {
        let room = existing_room_name(name)?;
        let deleted = self.to_room(&room, ServerEvent::RoomDeleted { room: room.clone() });
        self.registry.delete(&room, requester)?;
        tracing::info!("Room '{}' deleted by '{}'", room, requester);
        Ok(vec![
            deleted,
            Effect::PurgeHistory(room),
            self.room_counts_update(),
        ])
    }

    pub fn transfer_owner(
        &mut self,
        name: &str,
        requester: &Nickname,
        new_owner: Nickname,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = existing_room_name(name)?;
        self.registry
            .transfer_owner(&room, requester, new_owner.clone())?;
        tracing::info!(
            "Ownership of room '{}' transferred from '{}' to '{}'",
            room,
            requester,
            new_owner
        );
        Ok(vec![self.to_room(
            &room,
            ServerEvent::OwnerChanged {
                room: room.clone(),
                new_owner,
            },
        )])
    }

    pub fn set_notice(
        &mut self,
        name: &str,
        requester: &Nickname,
        notice: String,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = existing_room_name(name)?;
        self.registry.set_notice(&room, requester, notice.clone())?;
        tracing::info!("Notice of room '{}' set by '{}'", room, requester);
        Ok(vec![self.to_room(
            &room,
            ServerEvent::Notice {
                room: room.clone(),
                notice,
            },
        )])
    }

    /// `target` を `name` から追い出す。対象には `kicked` を送り、
    /// その後ログアウトと同じくセッションを終了する
    pub fn kick(
        &mut self,
        name: &str,
        requester: &Nickname,
        target: &Nickname,
    ) -> Result<Vec<Effect>, RoomError> {
        let room = existing_room_name(name)?;
        let record = self
            .registry
            .get(&room)
            .ok_or_else(|| RoomError::NotFound(room.to_string()))?;
        if !record.is_owned_by(requester) {
            return Err(RoomError::NotOwner(room.to_string()));
        }
        let connection =
            self.connection_of(&room, target)
                .ok_or_else(|| RoomError::MemberNotFound {
                    room: room.to_string(),
                    target: target.to_string(),
                })?;

        tracing::info!("'{}' kicked '{}' from room '{}'", requester, target, room);
        let mut effects = vec![self.to_connection(connection, ServerEvent::Kicked { room })];
        effects.extend(self.end_session(connection));
        Ok(effects)
    }

    /// 全ての部屋と在室人数（デフォルトルームが先頭）
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.registry
            .list_with_counts(|room| self.member_count(room))
    }

    /// 生のニックネームが使えるかどうかの事前確認
    pub fn check_nickname(&self, nickname: &str) -> Result<(), DirectoryError> {
        let nickname = Nickname::new(nickname.to_string())?;
        if nickname.is_reserved() {
            return Err(DirectoryError::Reserved(nickname.into_string()));
        }
        if !self.directory.is_available(&nickname) {
            return Err(DirectoryError::NameTaken(nickname.into_string()));
        }
        Ok(())
    }
}

/// 管理操作の部屋名は既存の部屋を指すだけなので長さ制限はかけない。
/// 空の名前はどの部屋にも一致しない
fn existing_room_name(name: &str) -> Result<RoomName, RoomError> {
    RoomName::lenient(name).ok_or_else(|| RoomError::NotFound(name.to_string()))
}
