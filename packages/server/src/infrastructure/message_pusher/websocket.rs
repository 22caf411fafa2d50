//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - イベントのエンコードと送信（push_to, push_pending, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われる。
//! この実装は生成された `UnboundedSender` を受け取り、送信に使うだけである。
//! `unregister_client` で sender を drop すると、UI 層の送信ループは
//! キューに残ったフレームを送り切ってから終了し、ソケットが閉じられる。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, OutboundFrame, PusherChannel, ServerEvent,
    },
    infrastructure::codec::WireCodec,
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
    codec: WireCodec,
}

impl WebSocketMessagePusher {
    pub fn new(codec: WireCodec) -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
            codec,
        }
    }

    /// 登録中の接続数
    #[cfg(test)]
    async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    async fn enqueue(
        &self,
        connection: &ConnectionId,
        frame: OutboundFrame,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        let sender = clients
            .get(connection)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection, sender);
        tracing::debug!("Connection {} registered to MessagePusher", connection);
    }

    async fn unregister_client(&self, connection: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection).is_some() {
            tracing::debug!("Connection {} unregistered from MessagePusher", connection);
        }
    }

    async fn push_to(
        &self,
        connection: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let frame = self.codec.encode(event)?;
        self.enqueue(connection, OutboundFrame::Ready(frame)).await?;
        tracing::debug!("Pushed '{}' to connection {}", event.kind(), connection);
        Ok(())
    }

    async fn push_pending(
        &self,
        connection: &ConnectionId,
        event: BoxFuture<'static, ServerEvent>,
    ) -> Result<(), MessagePushError> {
        let codec = self.codec;
        let target = *connection;
        let frame = async move {
            let event = event.await;
            match codec.encode(&event) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::warn!("Dropping '{}' for connection {}: {}", event.kind(), target, e);
                    None
                }
            }
        }
        .boxed();
        self.enqueue(connection, OutboundFrame::Pending(frame)).await?;
        tracing::debug!("Queued pending event for connection {}", connection);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        // 宛先が何件あってもエンコードは 1 回だけ
        let frame = self.codec.encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if let Err(e) = sender.send(OutboundFrame::Ready(frame.clone())) {
                        tracing::warn!("Failed to push '{}' to connection {}: {}", event.kind(), target, e);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection {} not found during broadcast of '{}', skipping",
                        target,
                        event.kind()
                    );
                }
            }
        }
        tracing::debug!("Broadcasted '{}' to {} connections", event.kind(), targets.len());

        Ok(())
    }
}
