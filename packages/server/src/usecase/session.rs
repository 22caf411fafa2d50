//! UseCase: WebSocket セッションの処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SessionCoordinator の connect / handle_message / disconnect
//! - ハブの状態遷移と実際に各接続へ届くフレームの対応
//!
//! ### なぜこのテストが必要か
//! - ハブ単体のテストは Effect までしか見ないため、配信・永続化まで通した結果を確認する
//! - 未ログインの接続からのチャットが配信も永続化もされないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン、チャット、部屋の移動、ログアウト
//! - 異常系：ニックネームの重複、未ログインでのチャット
//! - エッジケース：オーナーの切断による部屋の連鎖削除

use std::sync::Arc;

use roomhub_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{ChatHub, ConnectionId, InboundMessage, PusherChannel, Timestamp};

use super::dispatcher::Dispatcher;

/// セッション処理のユースケース
///
/// ハブのロックを 1 回取得するごとに 1 つのイベントを処理し、
/// 得られた Effect をロックを保持したまま実行する。
pub struct SessionCoordinator {
    hub: Arc<Mutex<ChatHub>>,
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn Clock>,
}

impl SessionCoordinator {
    pub fn new(hub: Arc<Mutex<ChatHub>>, dispatcher: Arc<Dispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            hub,
            dispatcher,
            clock,
        }
    }

    /// 新しい接続を未ログイン状態で登録する
    pub async fn connect(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut hub = self.hub.lock().await;
        self.dispatcher.register(connection, sender).await;
        hub.connect(connection);
        tracing::info!("Connection {} opened", connection);
    }

    /// デコード済みのクライアントメッセージを処理する
    pub async fn handle_message(&self, connection: ConnectionId, message: InboundMessage) {
        match message {
            InboundMessage::Login { nickname, room } => {
                self.login(connection, &nickname, room.as_deref()).await
            }
            InboundMessage::Chat { content } => self.chat(connection, content).await,
            InboundMessage::Logout => self.logout(connection).await,
            InboundMessage::Join { room } => self.switch_room(connection, room.as_deref()).await,
            InboundMessage::Unknown => {
                tracing::debug!("Ignoring unknown message type from connection {}", connection);
            }
        }
    }

    pub async fn login(&self, connection: ConnectionId, nickname: &str, room: Option<&str>) {
        let mut hub = self.hub.lock().await;
        let effects = hub.login(connection, nickname, room);
        self.dispatcher.dispatch(effects).await;
    }

    pub async fn chat(&self, connection: ConnectionId, content: String) {
        let time = Timestamp::new(self.clock.now_millis());
        let mut hub = self.hub.lock().await;
        let effects = hub.chat(connection, content, time);
        self.dispatcher.dispatch(effects).await;
    }

    pub async fn switch_room(&self, connection: ConnectionId, room: Option<&str>) {
        let mut hub = self.hub.lock().await;
        let effects = hub.switch_room(connection, room);
        self.dispatcher.dispatch(effects).await;
    }

    pub async fn logout(&self, connection: ConnectionId) {
        let mut hub = self.hub.lock().await;
        let effects = hub.logout(connection);
        self.dispatcher.dispatch(effects).await;
    }

    /// トランスポートの切断。どの状態からでも呼べる
    pub async fn disconnect(&self, connection: ConnectionId) {
        let mut hub = self.hub.lock().await;
        let effects = hub.disconnect(connection);
        self.dispatcher.dispatch(effects).await;
        tracing::info!("Connection {} closed", connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ChatMessage, MessagePusher, MessageStore, OutboundFrame, RepositoryError, RoomName,
            pusher::MockMessagePusher, repository::MockMessageStore,
        },
        infrastructure::{
            codec::{WireCodec, WireFormat},
            dto::websocket::{HistoryEntryDto, ServerMessageDto},
            message_pusher::WebSocketMessagePusher,
            repository::InMemoryMessageStore,
        },
        usecase::persistence::PersistenceQueue,
    };
    use roomhub_shared::time::FixedClock;
    use tokio::sync::mpsc;

    const NOW: i64 = 1_700_000_000_000;

    struct TestContext {
        coordinator: SessionCoordinator,
        hub: Arc<Mutex<ChatHub>>,
    }

    fn create_test_coordinator() -> TestContext {
        let hub = Arc::new(Mutex::new(ChatHub::new(
            RoomName::new("lobby".to_string()).unwrap(),
        )));
        let pusher = Arc::new(WebSocketMessagePusher::new(WireCodec::new(WireFormat::Json)));
        let (queue, _handle) = PersistenceQueue::spawn(Arc::new(InMemoryMessageStore::new()));
        let dispatcher = Arc::new(Dispatcher::new(pusher, queue, 100));
        let coordinator =
            SessionCoordinator::new(hub.clone(), dispatcher, Arc::new(FixedClock::new(NOW)));
        TestContext { coordinator, hub }
    }

    type FrameReceiver = mpsc::UnboundedReceiver<OutboundFrame>;

    async fn connect(ctx: &TestContext) -> (ConnectionId, FrameReceiver) {
        let connection = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        ctx.coordinator.connect(connection, tx).await;
        (connection, rx)
    }

    /// 積まれているフレームを全て確定させ、順にデコードする
    async fn drain(rx: &mut FrameReceiver) -> Vec<ServerMessageDto> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            if let Some(frame) = frame.resolve().await {
                frames.push(serde_json::from_str(&frame).unwrap());
            }
        }
        frames
    }

    /// history が届くまで読み進める
    async fn recv_history(rx: &mut FrameReceiver) -> ServerMessageDto {
        loop {
            let frame = rx.recv().await.unwrap().resolve().await.unwrap();
            let message: ServerMessageDto = serde_json::from_str(&frame).unwrap();
            if matches!(message, ServerMessageDto::History { .. }) {
                return message;
            }
        }
    }

    /// 履歴の読み出しに時間のかかるストア
    struct SlowMessageStore {
        inner: InMemoryMessageStore,
    }

    #[async_trait::async_trait]
    impl MessageStore for SlowMessageStore {
        async fn append_message(&self, message: ChatMessage) -> Result<(), RepositoryError> {
            self.inner.append_message(message).await
        }

        async fn fetch_recent(
            &self,
            room: &RoomName,
            limit: usize,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            self.inner.fetch_recent(room, limit).await
        }

        async fn purge_room(&self, room: &RoomName) -> Result<(), RepositoryError> {
            self.inner.purge_room(room).await
        }
    }

    #[tokio::test]
    async fn test_login_and_chat_reach_room_members() {
        // テスト項目: ログインした 2 人のうち一方のチャットが両方に届く
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (alice, mut alice_rx) = connect(&ctx).await;
        let (bob, mut bob_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", Some("rust")).await;
        ctx.coordinator.login(bob, "bob", Some("rust")).await;
        recv_history(&mut alice_rx).await;
        recv_history(&mut bob_rx).await;
        drain(&mut alice_rx).await;
        drain(&mut bob_rx).await;

        // when (操作):
        ctx.coordinator
            .handle_message(
                alice,
                InboundMessage::Chat {
                    content: "hello".to_string(),
                },
            )
            .await;

        // then (期待する結果):
        let expected = ServerMessageDto::Chat {
            nickname: "alice".to_string(),
            content: "hello".to_string(),
            time: NOW,
            room: "rust".to_string(),
        };
        assert_eq!(drain(&mut alice_rx).await, vec![expected.clone()]);
        assert_eq!(drain(&mut bob_rx).await, vec![expected]);
    }

    #[tokio::test]
    async fn test_history_is_replayed_on_join() {
        // テスト項目: 後から入室したユーザーに過去のメッセージが届く
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (alice, _alice_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", None).await;
        ctx.coordinator.chat(alice, "earlier".to_string()).await;
        let (bob, mut bob_rx) = connect(&ctx).await;

        // when (操作):
        ctx.coordinator.login(bob, "bob", None).await;

        // then (期待する結果):
        let history = recv_history(&mut bob_rx).await;
        assert_eq!(
            history,
            ServerMessageDto::History {
                history: vec![HistoryEntryDto {
                    nickname: "alice".to_string(),
                    content: "earlier".to_string(),
                    time: NOW,
                }]
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_login_gets_login_error() {
        // テスト項目: 使用中のニックネームでログインすると login_error だけが届く
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (alice, _alice_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", None).await;
        let (imposter, mut imposter_rx) = connect(&ctx).await;
        drain(&mut imposter_rx).await;

        // when (操作):
        ctx.coordinator
            .handle_message(
                imposter,
                InboundMessage::Login {
                    nickname: "alice".to_string(),
                    room: None,
                },
            )
            .await;

        // then (期待する結果):
        let frames = drain(&mut imposter_rx).await;
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], ServerMessageDto::LoginError { .. }));
    }

    #[tokio::test]
    async fn test_unauthenticated_chat_is_neither_broadcast_nor_persisted() {
        // テスト項目: 未ログインの接続からのチャットは配信も永続化もされない
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_register_client().times(1).returning(|_, _| ());
        pusher.expect_broadcast().times(0);
        pusher.expect_push_to().times(0);
        let mut store = MockMessageStore::new();
        store.expect_append_message().times(0);
        let (queue, handle) = PersistenceQueue::spawn(Arc::new(store));
        let pusher: Arc<dyn MessagePusher> = Arc::new(pusher);
        let dispatcher = Arc::new(Dispatcher::new(pusher, queue, 100));
        let hub = Arc::new(Mutex::new(ChatHub::new(
            RoomName::new("lobby".to_string()).unwrap(),
        )));
        let coordinator = SessionCoordinator::new(hub, dispatcher, Arc::new(FixedClock::new(NOW)));
        let connection = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        coordinator.connect(connection, tx).await;

        // when (操作):
        coordinator
            .handle_message(
                connection,
                InboundMessage::Chat {
                    content: "sneaky".to_string(),
                },
            )
            .await;

        // then (期待する結果):
        drop(coordinator);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_owner_disconnect_deletes_room_for_members() {
        // テスト項目: オーナーの切断で部屋が削除され、残ったメンバーに room_deleted が届く
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (owner, _owner_rx) = connect(&ctx).await;
        let (member, mut member_rx) = connect(&ctx).await;
        ctx.coordinator.login(owner, "owner", Some("rust")).await;
        ctx.coordinator.login(member, "member", Some("rust")).await;
        recv_history(&mut member_rx).await;
        drain(&mut member_rx).await;

        // when (操作):
        ctx.coordinator.disconnect(owner).await;

        // then (期待する結果):
        let frames = drain(&mut member_rx).await;
        assert!(frames.contains(&ServerMessageDto::RoomDeleted {
            room: "rust".to_string()
        }));
        let hub = ctx.hub.lock().await;
        assert!(
            !hub.registry()
                .contains(&RoomName::new("rust".to_string()).unwrap())
        );
    }

    #[tokio::test]
    async fn test_logout_closes_outbound_channel() {
        // テスト項目: ログアウトすると送信チャンネルが閉じ、ニックネームが解放される
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (alice, mut alice_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", None).await;

        // when (操作):
        ctx.coordinator
            .handle_message(alice, InboundMessage::Logout)
            .await;

        // then (期待する結果):
        // 残りのフレームを読み切ると None になる
        while alice_rx.recv().await.is_some() {}
        let hub = ctx.hub.lock().await;
        assert!(hub.session(&alice).is_none());
        assert!(hub.check_nickname("alice").is_ok());
    }

    #[tokio::test]
    async fn test_join_message_switches_room() {
        // テスト項目: join メッセージでログイン中のまま部屋を移動できる
        // given (前提条件):
        let ctx = create_test_coordinator();
        let (alice, mut alice_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", None).await;
        recv_history(&mut alice_rx).await;
        drain(&mut alice_rx).await;

        // when (操作):
        ctx.coordinator
            .handle_message(
                alice,
                InboundMessage::Join {
                    room: Some("rust".to_string()),
                },
            )
            .await;

        // then (期待する結果):
        recv_history(&mut alice_rx).await;
        let hub = ctx.hub.lock().await;
        let binding = hub.binding(&alice).unwrap();
        assert_eq!(binding.room.as_str(), "rust");
        assert_eq!(
            hub.registry()
                .get(&binding.room)
                .map(|room| room.owner.as_str().to_string()),
            Some("alice".to_string())
        );
    }

    #[tokio::test]
    async fn test_history_arrives_before_later_chat() {
        // テスト項目: 履歴の読み出しが遅くても、入室後のチャットは history の後に届く
        // given (前提条件):
        let hub = Arc::new(Mutex::new(ChatHub::new(
            RoomName::new("lobby".to_string()).unwrap(),
        )));
        let pusher = Arc::new(WebSocketMessagePusher::new(WireCodec::new(WireFormat::Json)));
        let store = SlowMessageStore {
            inner: InMemoryMessageStore::new(),
        };
        let (queue, _handle) = PersistenceQueue::spawn(Arc::new(store));
        let dispatcher = Arc::new(Dispatcher::new(pusher, queue, 100));
        let ctx = TestContext {
            coordinator: SessionCoordinator::new(
                hub.clone(),
                dispatcher,
                Arc::new(FixedClock::new(NOW)),
            ),
            hub,
        };
        let (alice, _alice_rx) = connect(&ctx).await;
        let (bob, mut bob_rx) = connect(&ctx).await;
        ctx.coordinator.login(alice, "alice", None).await;
        ctx.coordinator.login(bob, "bob", None).await;

        // when (操作):
        ctx.coordinator.chat(alice, "live".to_string()).await;

        // then (期待する結果):
        let frames = drain(&mut bob_rx).await;
        let history = frames
            .iter()
            .position(|frame| matches!(frame, ServerMessageDto::History { .. }))
            .unwrap();
        let chat = frames
            .iter()
            .position(|frame| matches!(frame, ServerMessageDto::Chat { .. }))
            .unwrap();
        assert!(history < chat);
        assert_eq!(
            frames[history],
            ServerMessageDto::History {
                history: Vec::new()
            }
        );
    }
}
