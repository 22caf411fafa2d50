//! MessagePusher trait 定義
//!
//! 誰に何を届けるかはドメイン層が決め、接続ごとの送信チャンネルと
//! ワイヤ形式へのエンコードは Infrastructure 層の実装が受け持つ。

use std::fmt;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::ServerEvent, value_object::ConnectionId};

/// 接続ごとの送信キューに積まれるフレーム
pub enum OutboundFrame {
    /// エンコード済みのフレーム
    Ready(String),
    /// 後から確定するフレーム。確定するまで同じ接続の後続フレームは送られない
    Pending(BoxFuture<'static, Option<String>>),
}

impl OutboundFrame {
    /// 送信するフレームを確定させる。`None` は送るものが無いことを表す
    pub async fn resolve(self) -> Option<String> {
        match self {
            Self::Ready(frame) => Some(frame),
            Self::Pending(frame) => frame.await,
        }
    }
}

impl fmt::Debug for OutboundFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(frame) => f.debug_tuple("Ready").field(frame).finish(),
            Self::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// 1 接続分の送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<OutboundFrame>;

/// MessagePusher trait
///
/// UseCase 層はこの trait に依存し、WebSocket などの具体的な送信手段には依存しない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// `connection` 宛てのイベントを `sender` に流し始める
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// `connection` の送信チャンネルを破棄する。
    /// 全ての sender が無くなると、トランスポートは積まれたフレームを送り切ってからソケットを閉じる
    async fn unregister_client(&self, connection: &ConnectionId);

    async fn push_to(
        &self,
        connection: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;

    /// まだ確定していないイベントを `connection` のキューに積む
    ///
    /// 積んだ位置で送信順が決まり、`event` が確定するまで後続のイベントは保留される。
    async fn push_pending(
        &self,
        connection: &ConnectionId,
        event: BoxFuture<'static, ServerEvent>,
    ) -> Result<(), MessagePushError>;

    /// 全ての宛先に `event` を送る。個別の送信失敗はログに残してスキップし、
    /// エンコードの失敗だけをエラーとして返す
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
