//! チャットドメインの値オブジェクト

use std::fmt;

use uuid::Uuid;

use super::error::ValueError;

/// 作成 API が受け付ける部屋名の最大長（文字数）
pub const MAX_ROOM_NAME_CHARS: usize = 32;

/// セッション中の参加者を識別する表示名
///
/// 比較は大文字小文字を区別する完全一致。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nickname(String);

impl Nickname {
    const SYSTEM: &'static str = "system";
    const UNKNOWN: &'static str = "unknown";

    /// ニックネームを作る。空白だけの入力は拒否する
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyNickname);
        }
        Ok(Self(value))
    }

    /// デフォルトルームのオーナー
    pub fn system() -> Self {
        Self(Self::SYSTEM.to_string())
    }

    /// 参加時に自動作成された部屋のオーナー
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// 予約済みのオーナー名は参加者が使えない
    pub fn is_reserved(&self) -> bool {
        self.0 == Self::SYSTEM || self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャットルームの名前
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomName(String);

impl RoomName {
    /// 作成 API 用の部屋名を作る。空でなく、
    /// [`MAX_ROOM_NAME_CHARS`] 文字以内であること
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyRoomName);
        }
        let length = value.chars().count();
        if length > MAX_ROOM_NAME_CHARS {
            return Err(ValueError::RoomNameTooLong {
                max: MAX_ROOM_NAME_CHARS,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    /// 参加要求や検索で渡された部屋名
    ///
    /// 拒否するのは空の入力だけで、[`RoomName::new`] の長さ制限はかけない。
    /// 参加時に自動作成される部屋は長さを検査してこなかった。
    pub fn lenient(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート接続を表す不透明なハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい接続 ID を発行する
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ミリ秒単位の Unix タイムスタンプ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// チャットメッセージの本文。テキスト・画像リンク・Markdown をそのまま運ぶ。
/// 拒否するのは空の本文だけ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.is_empty() {
            return Err(ValueError::EmptyContent);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
