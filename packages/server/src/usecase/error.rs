//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RoomError, ValueError};

/// 部屋の管理操作のエラー
///
/// `Display` の内容はそのまま管理 API の `msg` になる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManageRoomError {
    #[error(transparent)]
    Room(#[from] RoomError),

    /// 操作者や移譲先のニックネームが不正
    #[error(transparent)]
    Invalid(#[from] ValueError),
}
