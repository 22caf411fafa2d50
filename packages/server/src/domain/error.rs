//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("room name must not be empty")]
    EmptyRoomName,

    #[error("room name must be at most {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    #[error("message content must not be empty")]
    EmptyContent,
}

/// ニックネームのディレクトリのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// 別の接続が既にそのニックネームを使っている
    #[error("nickname '{0}' is already in use, please choose another one")]
    NameTaken(String),

    /// システム用に予約されたニックネーム
    #[error("nickname '{0}' is reserved, please choose another one")]
    Reserved(String),

    #[error(transparent)]
    Invalid(#[from] ValueError),
}

/// 部屋のレジストリ・管理操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room '{0}' does not exist")]
    NotFound(String),

    #[error("room '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid room name: {0}")]
    InvalidName(#[from] ValueError),

    #[error("the default room cannot be deleted")]
    DefaultRoom,

    #[error("only the owner of room '{0}' can do this")]
    NotOwner(String),

    #[error("'{target}' is not in room '{room}'")]
    MemberNotFound { room: String, target: String },
}

/// メッセージストアが返すエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// 接続へのイベント送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}
