//! UseCase: ハブが返した Effect の実行
//!
//! 配信は MessagePusher へ、永続化は PersistenceQueue へ振り分ける。
//! 呼び出し側はハブのロックを保持したまま `dispatch` を呼ぶので、
//! 同じ接続へのイベントはハブの処理順どおりに並ぶ。

use std::sync::Arc;

use futures_util::future::FutureExt;

use crate::domain::{ConnectionId, Effect, MessagePusher, PusherChannel, RoomName, ServerEvent};

use super::persistence::PersistenceQueue;

/// Effect の実行器
pub struct Dispatcher {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    persistence: PersistenceQueue,
    /// 入室時に再送する履歴の件数
    history_limit: usize,
}

impl Dispatcher {
    pub fn new(
        message_pusher: Arc<dyn MessagePusher>,
        persistence: PersistenceQueue,
        history_limit: usize,
    ) -> Self {
        Self {
            message_pusher,
            persistence,
            history_limit,
        }
    }

    /// 接続の送信チャンネルを登録する
    pub async fn register(&self, connection: ConnectionId, sender: PusherChannel) {
        self.message_pusher.register_client(connection, sender).await;
    }

    /// Effect を順に実行する
    ///
    /// 送信の失敗はログに残して握りつぶす。
    pub async fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Deliver { recipients, event } => {
                    if recipients.is_empty() {
                        continue;
                    }
                    if let Err(e) = self.message_pusher.broadcast(&recipients, &event).await {
                        tracing::warn!("Failed to broadcast '{}': {}", event.kind(), e);
                    }
                }
                Effect::Unicast { connection, event } => {
                    if let Err(e) = self.message_pusher.push_to(&connection, &event).await {
                        tracing::warn!(
                            "Failed to push '{}' to connection {}: {}",
                            event.kind(),
                            connection,
                            e
                        );
                    }
                }
                Effect::AppendMessage(message) => self.persistence.append(message),
                Effect::PurgeHistory(room) => self.persistence.purge(room),
                Effect::ReplayHistory { connection, room } => {
                    self.replay_history(connection, room).await
                }
                Effect::Close(connection) => {
                    self.message_pusher.unregister_client(&connection).await;
                }
            }
        }
    }

    /// 履歴の読み出しを積み、確定前の history イベントとして接続のキューに積む
    ///
    /// 読み出しの完了はロックの外（接続の送信ループ）で待つので、他のセッションは止まらない。
    /// 同じ接続へのそれ以降のイベントは history の後に届く。
    async fn replay_history(&self, connection: ConnectionId, room: RoomName) {
        let reply = self.persistence.request_recent(room, self.history_limit);
        let history = async move {
            let entries = reply.await.unwrap_or_default();
            ServerEvent::History { entries }
        }
        .boxed();
        if let Err(e) = self.message_pusher.push_pending(&connection, history).await {
            tracing::debug!("History for connection {} dropped: {}", connection, e);
        }
    }
}
