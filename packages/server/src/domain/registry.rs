//! 部屋のレジストリ: 部屋の一覧の正本

use super::{
    entity::{Room, RoomSummary},
    error::RoomError,
    value_object::{Nickname, RoomName},
};

/// 作成順に並んだ部屋。先頭はデフォルトルーム
///
/// デフォルトルームはレジストリと同時に作られ、オーナーは [`Nickname::system`] で、
/// 削除できない。
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
    default_room: RoomName,
}

impl RoomRegistry {
    pub fn new(default_room: RoomName) -> Self {
        Self {
            rooms: vec![Room::new(default_room.clone(), Nickname::system())],
            default_room,
        }
    }

    pub fn default_room(&self) -> &RoomName {
        &self.default_room
    }

    pub fn is_default(&self, name: &RoomName) -> bool {
        name == &self.default_room
    }

    pub fn get(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.iter().find(|room| &room.name == name)
    }

    fn get_mut(&mut self, name: &RoomName) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| &room.name == name)
    }

    pub fn contains(&self, name: &RoomName) -> bool {
        self.get(name).is_some()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// 作成 API からの部屋作成
    pub fn create(&mut self, name: &str, owner: Nickname) -> Result<RoomName, RoomError> {
        let name = RoomName::new(name.to_string())?;
        if self.contains(&name) {
            return Err(RoomError::AlreadyExists(name.into_string()));
        }
        self.rooms.push(Room::new(name.clone(), owner));
        Ok(name)
    }

    /// 参加のために部屋を探す。無ければ [`Nickname::unknown`] をオーナーとして作る
    /// 作成したかどうかも返す
    pub fn get_or_auto_create(&mut self, name: &RoomName) -> bool {
        if self.contains(name) {
            return false;
        }
        self.rooms.push(Room::new(name.clone(), Nickname::unknown()));
        true
    }

    /// オーナーによる削除
    pub fn delete(&mut self, name: &RoomName, requester: &Nickname) -> Result<Room, RoomError> {
        if self.is_default(name) {
            return Err(RoomError::DefaultRoom);
        }
        let room = self
            .get(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;
        if !room.is_owned_by(requester) {
            return Err(RoomError::NotOwner(name.to_string()));
        }
        self.remove(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))
    }

    /// カスケード・空室削除用。オーナーチェックはしない
    pub fn remove(&mut self, name: &RoomName) -> Option<Room> {
        if self.is_default(name) {
            return None;
        }
        let index = self.rooms.iter().position(|room| &room.name == name)?;
        Some(self.rooms.remove(index))
    }

    pub fn set_notice(
        &mut self,
        name: &RoomName,
        requester: &Nickname,
        notice: String,
    ) -> Result<(), RoomError> {
        let room = self.owned_room_mut(name, requester)?;
        room.notice = notice;
        Ok(())
    }

    pub fn transfer_owner(
        &mut self,
        name: &RoomName,
        requester: &Nickname,
        new_owner: Nickname,
    ) -> Result<(), RoomError> {
        let room = self.owned_room_mut(name, requester)?;
        room.owner = new_owner;
        Ok(())
    }

    /// 再選出によるオーナーの付け替え
    pub fn set_owner(&mut self, name: &RoomName, owner: Nickname) {
        if let Some(room) = self.get_mut(name) {
            room.owner = owner;
        }
    }

    /// `nickname` がオーナーのデフォルト以外の部屋
    pub fn owned_by(&self, nickname: &Nickname) -> Vec<RoomName> {
        self.rooms
            .iter()
            .filter(|room| room.is_owned_by(nickname) && !self.is_default(&room.name))
            .map(|room| room.name.clone())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &RoomName> {
        self.rooms.iter().map(|room| &room.name)
    }

    /// 全ての部屋と、`count` が返す在室人数
    pub fn list_with_counts(&self, count: impl Fn(&RoomName) -> usize) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|room| RoomSummary {
                name: room.name.clone(),
                owner: room.owner.clone(),
                notice: room.notice.clone(),
                member_count: count(&room.name),
            })
            .collect()
    }

    fn owned_room_mut(
        &mut self,
        name: &RoomName,
        requester: &Nickname,
    ) -> Result<&mut Room, RoomError> {
        let room = self
            .get_mut(name)
            .ok_or_else(|| RoomError::NotFound(name.to_string()))?;
        if !room.is_owned_by(requester) {
            return Err(RoomError::NotOwner(name.to_string()));
        }
        Ok(room)
    }
}
