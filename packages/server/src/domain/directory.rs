//! ニックネームのディレクトリ: どの接続がどのニックネームを持っているか

use std::collections::HashMap;

use super::{
    error::DirectoryError,
    value_object::{ConnectionId, Nickname},
};

/// 生存中のニックネームと、それを持つ接続の対応表
///
/// 1 つのニックネームを同時に持てる接続は 1 つだけ。
/// ディレクトリはハブの中にあるため、`register` は同時ログインに対してアトミック。
#[derive(Debug, Default)]
pub struct Directory {
    holders: HashMap<Nickname, ConnectionId>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `nickname` を `connection` のものとして登録する
    pub fn register(
        &mut self,
        nickname: &Nickname,
        connection: ConnectionId,
    ) -> Result<(), DirectoryError> {
        if nickname.is_reserved() {
            return Err(DirectoryError::Reserved(nickname.to_string()));
        }
        if self.holders.contains_key(nickname) {
            return Err(DirectoryError::NameTaken(nickname.to_string()));
        }
        self.holders.insert(nickname.clone(), connection);
        Ok(())
    }

    /// `nickname` を解放する。登録されていなければ何もしない
    pub fn unregister(&mut self, nickname: &Nickname) {
        self.holders.remove(nickname);
    }

    /// ログイン前の事前確認用。最終的な判定は `register` が行う
    pub fn is_available(&self, nickname: &Nickname) -> bool {
        !nickname.is_reserved() && !self.holders.contains_key(nickname)
    }

    #[cfg(test)]
    pub fn holder(&self, nickname: &Nickname) -> Option<ConnectionId> {
        self.holders.get(nickname).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.holders.len()
    }
}
