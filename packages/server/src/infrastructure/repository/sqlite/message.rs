//! SQLite MessageStore 実装
//!
//! `rusqlite` は同期 API なので、クエリは `spawn_blocking` の中で実行する。
//! 接続は 1 本だけで、Mutex で直列化する。

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{Connection, params};

use crate::domain::{
    ChatMessage, MessageContent, MessageStore, Nickname, RepositoryError, RoomName, Timestamp,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname TEXT,
    content TEXT,
    time INTEGER,
    room TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_room ON messages (room, id);
";

/// SQLite MessageStore 実装
#[derive(Clone)]
pub struct SqliteMessageStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    /// `path` のデータベースを開く（無ければ作成する）
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let connection = Connection::open(path.as_ref()).map_err(unavailable)?;
        Self::with_connection(connection)
    }

    /// プロセス内だけのデータベースを開く
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let connection = Connection::open_in_memory().map_err(unavailable)?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, RepositoryError> {
        connection.execute_batch(SCHEMA).map_err(unavailable)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// 接続を取り、ブロッキングスレッドで `query` を実行する
    async fn run<T, F>(&self, query: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let connection = connection
                .lock()
                .map_err(|e| RepositoryError::Unavailable(e.to_string()))?;
            query(&connection).map_err(unavailable)
        })
        .await
        .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
    }
}

fn unavailable(error: rusqlite::Error) -> RepositoryError {
    RepositoryError::Unavailable(error.to_string())
}

/// 保存済みの 1 行（NULL を含む古い行も読めるよう、全て Option で受ける）
struct MessageRow {
    nickname: Option<String>,
    content: Option<String>,
    time: Option<i64>,
}

impl MessageRow {
    /// ドメインモデルへ変換する。値の検証に通らない行は `None`
    fn into_message(self, room: &RoomName) -> Option<ChatMessage> {
        let nickname = Nickname::new(self.nickname?).ok()?;
        let content = MessageContent::new(self.content?).ok()?;
        Some(ChatMessage::new(
            room.clone(),
            nickname,
            content,
            Timestamp::new(self.time.unwrap_or_default()),
        ))
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append_message(&self, message: ChatMessage) -> Result<(), RepositoryError> {
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO messages (nickname, content, time, room) VALUES (?1, ?2, ?3, ?4)",
                params![
                    message.nickname.as_str(),
                    message.content.as_str(),
                    message.time.value(),
                    message.room.as_str()
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn fetch_recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let room_key = room.as_str().to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .run(move |connection| {
                let mut statement = connection.prepare(
                    "SELECT nickname, content, time FROM (
                         SELECT id, nickname, content, time FROM messages
                         WHERE room = ?1 ORDER BY id DESC LIMIT ?2
                     ) ORDER BY id ASC",
                )?;
                let rows = statement
                    .query_map(params![room_key, limit], |row| {
                        Ok(MessageRow {
                            nickname: row.get(0)?,
                            content: row.get(1)?,
                            time: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        let total = rows.len();
        let history: Vec<ChatMessage> = rows
            .into_iter()
            .filter_map(|row| row.into_message(room))
            .collect();
        if history.len() < total {
            tracing::warn!(
                "Skipped {} unreadable rows in history of room '{}'",
                total - history.len(),
                room
            );
        }
        Ok(history)
    }

    async fn purge_room(&self, room: &RoomName) -> Result<(), RepositoryError> {
        let room_key = room.as_str().to_string();
        self.run(move |connection| {
            connection.execute("DELETE FROM messages WHERE room = ?1", params![room_key])?;
            Ok(())
        })
        .await
    }
}
