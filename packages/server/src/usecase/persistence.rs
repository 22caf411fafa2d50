//! UseCase: メッセージ永続化キュー
//!
//! ストアへの書き込みと履歴の読み出しを 1 つのワーカータスクで FIFO 順に処理する。
//! 書き込みは投げっぱなし（fire-and-forget）で、呼び出し側はストアの完了を待たない。
//! 読み出しも同じキューに積まれるため、それ以前に積まれた書き込みの結果が必ず見える。

use std::sync::Arc;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::{ChatMessage, MessageStore, RoomName};

enum Command {
    Append(ChatMessage),
    Purge(RoomName),
    FetchRecent {
        room: RoomName,
        limit: usize,
        reply: oneshot::Sender<Vec<ChatMessage>>,
    },
}

/// 永続化ワーカーへのハンドル
///
/// 全てのハンドルが drop されるとワーカーは残りのコマンドを処理してから終了する。
#[derive(Clone)]
pub struct PersistenceQueue {
    sender: mpsc::UnboundedSender<Command>,
}

impl PersistenceQueue {
    /// ワーカータスクを起動し、キューのハンドルとタスクの JoinHandle を返す
    pub fn spawn(store: Arc<dyn MessageStore>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(store, receiver));
        (Self { sender }, handle)
    }

    /// メッセージの追記を積む
    pub fn append(&self, message: ChatMessage) {
        self.enqueue(Command::Append(message));
    }

    /// 部屋の履歴削除を積む
    pub fn purge(&self, room: RoomName) {
        self.enqueue(Command::Purge(room));
    }

    /// 直近 `limit` 件の履歴の読み出しを積む
    ///
    /// 積んだ時点でキュー上の順序が確定するので、待機はロックの外で行ってよい。
    /// ストアの失敗時は空の履歴が返る。
    pub fn request_recent(
        &self,
        room: RoomName,
        limit: usize,
    ) -> oneshot::Receiver<Vec<ChatMessage>> {
        let (reply, receiver) = oneshot::channel();
        self.enqueue(Command::FetchRecent { room, limit, reply });
        receiver
    }

    fn enqueue(&self, command: Command) {
        if self.sender.send(command).is_err() {
            tracing::error!("Persistence worker has stopped, dropping command");
        }
    }
}

async fn run_worker(store: Arc<dyn MessageStore>, mut receiver: mpsc::UnboundedReceiver<Command>) {
    tracing::debug!("Persistence worker started");
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Append(message) => {
                if let Err(e) = store.append_message(message).await {
                    tracing::warn!("Failed to persist message: {}", e);
                }
            }
            Command::Purge(room) => match store.purge_room(&room).await {
                Ok(()) => tracing::debug!("Purged history of room '{}'", room),
                Err(e) => tracing::warn!("Failed to purge history of room '{}': {}", room, e),
            },
            Command::FetchRecent { room, limit, reply } => {
                let history = store.fetch_recent(&room, limit).await.unwrap_or_else(|e| {
                    tracing::warn!("Failed to load history of room '{}': {}", room, e);
                    Vec::new()
                });
                // 受信側が先に切断していれば結果は捨てる
                let _ = reply.send(history);
            }
        }
    }
    tracing::debug!("Persistence worker stopped");
}
