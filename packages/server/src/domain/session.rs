//! 接続ごとのセッション状態機械
//!
//! `Connected -> Joined(identity, room) -> closed`。現在の状態で無効なイベントは、
//! クライアントにエラーを返さず無視する。

use super::{
    effect::Effect,
    entity::ChatMessage,
    event::ServerEvent,
    hub::{ChatHub, SessionState},
    value_object::{ConnectionId, MessageContent, Nickname, Timestamp},
};

impl ChatHub {
    /// `nickname` を `connection` のものとして登録し、`room` に参加させる
    /// （未指定や空ならデフォルトルーム）
    ///
    /// 登録を拒否した場合は `login_error` を返し、クライアントが再試行できるよう
    /// 未認証のまま残す。
    pub fn login(
        &mut self,
        connection: ConnectionId,
        nickname: &str,
        room: Option<&str>,
    ) -> Vec<Effect> {
        match self.sessions.get(&connection) {
            Some(SessionState::Connected) => {}
            Some(SessionState::Joined(binding)) => {
                tracing::warn!(
                    "Ignoring login on connection {} already joined as '{}'",
                    connection,
                    binding.nickname
                );
                return Vec::new();
            }
            None => {
                tracing::warn!("Ignoring login on unknown connection {}", connection);
                return Vec::new();
            }
        }

        let nickname = match Nickname::new(nickname.to_string()) {
            Ok(nickname) => nickname,
            Err(e) => {
                tracing::warn!("Rejected login on connection {}: {}", connection, e);
                return vec![self.login_error(connection, e.to_string())];
            }
        };
        if let Err(e) = self.directory.register(&nickname, connection) {
            tracing::warn!("Rejected login on connection {}: {}", connection, e);
            return vec![self.login_error(connection, e.to_string())];
        }

        let room = self.resolve_join_room(room);
        self.join(connection, nickname, room)
    }

    /// 参加中の接続からのチャットを永続化してブロードキャストする
    pub fn chat(&mut self, connection: ConnectionId, content: String, time: Timestamp) -> Vec<Effect> {
        let Some(binding) = self.binding(&connection) else {
            tracing::debug!("Ignoring chat from unauthenticated connection {}", connection);
            return Vec::new();
        };
        if !self.registry.contains(&binding.room) {
            tracing::debug!(
                "Ignoring chat from '{}' to deleted room '{}'",
                binding.nickname,
                binding.room
            );
            return Vec::new();
        }
        let Ok(content) = MessageContent::new(content) else {
            tracing::debug!("Ignoring empty chat message from '{}'", binding.nickname);
            return Vec::new();
        };

        let message = ChatMessage::new(
            binding.room.clone(),
            binding.nickname.clone(),
            content,
            time,
        );
        let broadcast = self.to_room(&message.room, ServerEvent::Chat(message.clone()));
        vec![Effect::AppendMessage(message), broadcast]
    }

    /// 参加中の接続をログアウトさせずに別の部屋へ移す
    ///
    /// 他の部屋の所有はそのまま。元の部屋は通常の退出チェックを通る。
    pub fn switch_room(&mut self, connection: ConnectionId, room: Option<&str>) -> Vec<Effect> {
        let target = self.resolve_join_room(room);
        match self.binding(&connection) {
            Some(binding) if binding.room == target => return Vec::new(),
            Some(_) => {}
            None => {
                tracing::debug!("Ignoring room switch from unauthenticated connection {}", connection);
                return Vec::new();
            }
        }

        let Some((binding, mut effects)) = self.leave(connection) else {
            return Vec::new();
        };
        effects.extend(self.join(connection, binding.nickname, target));
        effects
    }

    /// 明示的なログアウト。参加中の接続でのみ有効
    pub fn logout(&mut self, connection: ConnectionId) -> Vec<Effect> {
        if self.binding(&connection).is_none() {
            tracing::debug!("Ignoring logout from unauthenticated connection {}", connection);
            return Vec::new();
        }
        self.end_session(connection)
    }

    /// トランスポートの切断。どの状態でも有効
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Effect> {
        match self.sessions.get(&connection) {
            Some(SessionState::Joined(_)) => self.end_session(connection),
            Some(SessionState::Connected) => {
                self.sessions.remove(&connection);
                vec![Effect::Close(connection)]
            }
            None => Vec::new(),
        }
    }

    /// 参加中のセッションを片付ける: オーナーのカスケード、通常の退出、
    /// ニックネームの解放、最後に接続の終了
    ///
    /// カスケードは退出しようとしている部屋そのものを削除しうるので先に行う。
    pub(super) fn end_session(&mut self, connection: ConnectionId) -> Vec<Effect> {
        let Some(binding) = self.binding(&connection).cloned() else {
            return Vec::new();
        };

        let mut effects = self.cascade_owner_logout(&binding.nickname);
        if let Some((_, leave_effects)) = self.leave(connection) {
            effects.extend(leave_effects);
        }
        self.directory.unregister(&binding.nickname);
        self.sessions.remove(&connection);
        effects.push(Effect::Close(connection));
        effects.push(self.room_counts_update());
        tracing::info!("Session of '{}' ended", binding.nickname);
        effects
    }

    fn login_error(&self, connection: ConnectionId, error: String) -> Effect {
        self.to_connection(connection, ServerEvent::LoginError { error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::RoomName;

    fn nickname(value: &str) -> Nickname {
        Nickname::new(value.to_string()).unwrap()
    }

    fn room_name(value: &str) -> RoomName {
        RoomName::new(value.to_string()).unwrap()
    }

    fn create_test_hub() -> ChatHub {
        ChatHub::new(room_name("lobby"))
    }

    fn connect(hub: &mut ChatHub) -> ConnectionId {
        let connection = ConnectionId::generate();
        hub.connect(connection);
        connection
    }

    fn login(hub: &mut ChatHub, name: &str, room: &str) -> ConnectionId {
        let connection = connect(hub);
        hub.login(connection, name, Some(room));
        connection
    }

    fn events_for<'a>(effects: &'a [Effect], connection: &ConnectionId) -> Vec<&'a ServerEvent> {
        effects
            .iter()
            .filter(|effect| effect.reaches(connection))
            .filter_map(Effect::event)
            .collect()
    }

    #[test]
    fn test_login_success_effects() {
        // テスト項目: ログイン成功時に在室リスト・部屋人数・履歴再送が発生する
        // given (前提条件):
        let mut hub = create_test_hub();
        let alice = connect(&mut hub);

        // when (操作):
        let effects = hub.login(alice, "alice", None);

        // then (期待する結果):
        assert_eq!(
            hub.binding(&alice).map(|b| b.room.clone()),
            Some(room_name("lobby"))
        );
        let events = events_for(&effects, &alice);
        assert!(events.contains(&&ServerEvent::Users {
            users: vec![nickname("alice")]
        }));
        assert!(
            events
                .iter()
                .any(|event| matches!(event, ServerEvent::RoomUserCounts { .. }))
        );
        assert!(effects.contains(&Effect::ReplayHistory {
            connection: alice,
            room: room_name("lobby")
        }));
    }

    #[test]
    fn test_duplicate_login_is_rejected() {
        // テスト項目: 同じニックネームでの 2 回目のログインは login_error となり、最初のセッションは影響を受けない
        // given (前提条件):
        let mut hub = create_test_hub();
        let first = login(&mut hub, "alice", "rust");
        let second = connect(&mut hub);

        // when (操作):
        let effects = hub.login(second, "alice", Some("lobby"));

        // then (期待する結果):
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::Unicast { connection, event: ServerEvent::LoginError { .. } } if *connection == second
        ));
        assert_eq!(hub.session(&second), Some(&SessionState::Connected));
        assert_eq!(
            hub.binding(&first).map(|b| b.room.clone()),
            Some(room_name("rust"))
        );
        assert_eq!(hub.directory().holder(&nickname("alice")), Some(first));
    }

    #[test]
    fn test_rejected_login_can_retry() {
        // テスト項目: ログインに失敗した接続は別のニックネームで再試行できる
        // given (前提条件):
        let mut hub = create_test_hub();
        login(&mut hub, "alice", "lobby");
        let second = connect(&mut hub);
        hub.login(second, "alice", None);

        // when (操作):
        hub.login(second, "bob", None);

        // then (期待する結果):
        assert_eq!(
            hub.binding(&second).map(|b| b.nickname.clone()),
            Some(nickname("bob"))
        );
    }

    #[test]
    fn test_reserved_and_blank_nicknames_are_rejected() {
        // テスト項目: 予約名・空白のニックネームではログインできない
        // given (前提条件):
        let mut hub = create_test_hub();
        let connection = connect(&mut hub);

        // when (操作):
        let reserved = hub.login(connection, "unknown", None);
        let blank = hub.login(connection, " ", None);

        // then (期待する結果):
        for effects in [reserved, blank] {
            assert!(matches!(
                effects.as_slice(),
                [Effect::Unicast {
                    event: ServerEvent::LoginError { .. },
                    ..
                }]
            ));
        }
        assert_eq!(hub.session(&connection), Some(&SessionState::Connected));
    }

    #[test]
    fn test_login_without_nickname_gets_login_error() {
        // テスト項目: ニックネームが欠けたログイン（空文字列）は login_error が本人に返る
        // given (前提条件):
        let mut hub = create_test_hub();
        let connection = connect(&mut hub);

        // when (操作):
        let effects = hub.login(connection, "", Some("rust"));

        // then (期待する結果):
        assert!(matches!(
            effects.as_slice(),
            [Effect::Unicast {
                connection: target,
                event: ServerEvent::LoginError { .. },
            }] if *target == connection
        ));
        assert_eq!(hub.session(&connection), Some(&SessionState::Connected));
        assert!(hub.registry().get(&room_name("rust")).is_none());
    }

    #[test]
    fn test_login_sends_notice_when_set() {
        // テスト項目: 公告が設定された部屋にログインすると公告が本人に送られる
        // given (前提条件):
        let mut hub = create_test_hub();
        login(&mut hub, "alice", "rust");
        hub.set_notice("rust", &nickname("alice"), "be nice".to_string())
            .unwrap();
        let bob = connect(&mut hub);

        // when (操作):
        let effects = hub.login(bob, "bob", Some("rust"));

        // then (期待する結果):
        assert!(effects.contains(&Effect::Unicast {
            connection: bob,
            event: ServerEvent::Notice {
                room: room_name("rust"),
                notice: "be nice".to_string()
            }
        }));
    }

    #[test]
    fn test_chat_from_unauthenticated_connection_is_ignored() {
        // テスト項目: 未ログインの接続からのチャットは配信も永続化もされない
        // given (前提条件):
        let mut hub = create_test_hub();
        login(&mut hub, "alice", "lobby");
        let idle = connect(&mut hub);

        // when (操作):
        let effects = hub.chat(idle, "hello".to_string(), Timestamp::new(1000));

        // then (期待する結果):
        assert!(effects.is_empty());
    }

    #[test]
    fn test_chat_is_persisted_and_broadcast_to_room() {
        // テスト項目: チャットは永続化され、送信者を含む同じ部屋のメンバーに配信される
        // given (前提条件):
        let mut hub = create_test_hub();
        let alice = login(&mut hub, "alice", "rust");
        let bob = login(&mut hub, "bob", "rust");
        let carol = login(&mut hub, "carol", "lobby");

        // when (操作):
        let effects = hub.chat(alice, "hello".to_string(), Timestamp::new(1000));

        // then (期待する結果):
        let expected = ChatMessage::new(
            room_name("rust"),
            nickname("alice"),
            MessageContent::new("hello".to_string()).unwrap(),
            Timestamp::new(1000),
        );
        assert_eq!(effects[0], Effect::AppendMessage(expected.clone()));
        assert_eq!(effects[1].event(), Some(&ServerEvent::Chat(expected)));
        assert!(effects[1].reaches(&alice));
        assert!(effects[1].reaches(&bob));
        assert!(!effects[1].reaches(&carol));
    }

    #[test]
    fn test_empty_chat_is_ignored() {
        // テスト項目: 空のチャットは無視される
        // given (前提条件):
        let mut hub = create_test_hub();
        let alice = login(&mut hub, "alice", "lobby");

        // when (操作):
        let effects = hub.chat(alice, String::new(), Timestamp::new(1000));

        // then (期待する結果):
        assert!(effects.is_empty());
    }

    #[test]
    fn test_owner_disconnect_deletes_room_for_remaining_members() {
        // テスト項目: オーナーが切断するとメンバーが残っていても部屋が削除され、全員に room_deleted が届く
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");
        let a = login(&mut hub, "a", "rust");
        let b = login(&mut hub, "b", "rust");

        // when (操作):
        let effects = hub.disconnect(owner);

        // then (期待する結果):
        let deleted = ServerEvent::RoomDeleted {
            room: room_name("rust"),
        };
        assert!(events_for(&effects, &a).contains(&&deleted));
        assert!(events_for(&effects, &b).contains(&&deleted));
        assert!(!hub.registry().contains(&room_name("rust")));
        assert!(
            hub.list_rooms()
                .iter()
                .all(|summary| summary.name != room_name("rust"))
        );
        assert!(owner_changes_absent(&effects));
        assert!(hub.directory().is_available(&nickname("owner")));
        assert!(hub.session(&owner).is_none());
        assert!(effects.contains(&Effect::Close(owner)));
    }

    fn owner_changes_absent(effects: &[Effect]) -> bool {
        !effects
            .iter()
            .any(|effect| matches!(effect.event(), Some(ServerEvent::OwnerChanged { .. })))
    }

    #[test]
    fn test_cascade_runs_before_generic_leave() {
        // テスト項目: カスケード削除が先に実行され、削除済みの部屋でオーナー再選出は起きない
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");
        login(&mut hub, "a", "rust");

        // when (操作):
        let effects = hub.logout(owner);

        // then (期待する結果):
        assert!(matches!(
            effects[0].event(),
            Some(ServerEvent::RoomDeleted { .. })
        ));
        assert!(owner_changes_absent(&effects));
    }

    #[test]
    fn test_non_owner_disconnect_keeps_room() {
        // テスト項目: オーナー以外の切断では部屋は残り、オーナーも変わらず、残りのメンバーに在室リストが届く
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");
        let a = login(&mut hub, "a", "rust");

        // when (操作):
        let effects = hub.disconnect(a);

        // then (期待する結果):
        assert_eq!(
            hub.registry().get(&room_name("rust")).unwrap().owner,
            nickname("owner")
        );
        assert!(events_for(&effects, &owner).contains(&&ServerEvent::Users {
            users: vec![nickname("owner")]
        }));
        assert!(events_for(&effects, &a).is_empty());
    }

    #[test]
    fn test_switch_room_hands_ownership_to_remaining_member() {
        // テスト項目: オーナーがログアウトせず部屋を移動すると残ったメンバーがオーナーになる
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");
        let a = login(&mut hub, "a", "rust");

        // when (操作):
        let effects = hub.switch_room(owner, Some("lobby"));

        // then (期待する結果):
        assert_eq!(
            hub.registry().get(&room_name("rust")).unwrap().owner,
            nickname("a")
        );
        assert!(events_for(&effects, &a).contains(&&ServerEvent::OwnerChanged {
            room: room_name("rust"),
            new_owner: nickname("a")
        }));
        assert_eq!(
            hub.binding(&owner).map(|b| b.room.clone()),
            Some(room_name("lobby"))
        );
        assert_eq!(hub.directory().holder(&nickname("owner")), Some(owner));
    }

    #[test]
    fn test_switch_room_reaps_empty_room_without_owner_change() {
        // テスト項目: 誰も残らない部屋から移動すると owner_changed なしで部屋が削除される
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");

        // when (操作):
        let effects = hub.switch_room(owner, Some("lobby"));

        // then (期待する結果):
        assert!(!hub.registry().contains(&room_name("rust")));
        assert!(owner_changes_absent(&effects));
        assert!(effects.contains(&Effect::PurgeHistory(room_name("rust"))));
    }

    #[test]
    fn test_switch_to_same_room_is_noop() {
        // テスト項目: 同じ部屋への移動は何もしない
        // given (前提条件):
        let mut hub = create_test_hub();
        let alice = login(&mut hub, "alice", "rust");

        // when (操作):
        let effects = hub.switch_room(alice, Some("rust"));

        // then (期待する結果):
        assert!(effects.is_empty());
    }

    #[test]
    fn test_logout_requires_joined_session() {
        // テスト項目: 未ログインの接続からのログアウトは無視され、接続は維持される
        // given (前提条件):
        let mut hub = create_test_hub();
        let idle = connect(&mut hub);

        // when (操作):
        let effects = hub.logout(idle);

        // then (期待する結果):
        assert!(effects.is_empty());
        assert_eq!(hub.session(&idle), Some(&SessionState::Connected));
    }

    #[test]
    fn test_disconnect_of_unauthenticated_connection() {
        // テスト項目: 未ログインの接続が切断されると接続だけが破棄される
        // given (前提条件):
        let mut hub = create_test_hub();
        let idle = connect(&mut hub);

        // when (操作):
        let effects = hub.disconnect(idle);
        let again = hub.disconnect(idle);

        // then (期待する結果):
        assert_eq!(effects, vec![Effect::Close(idle)]);
        assert!(again.is_empty());
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn test_chat_to_room_deleted_by_cascade_is_ignored() {
        // テスト項目: カスケード削除された部屋に残ったメンバーのチャットは無視される
        // given (前提条件):
        let mut hub = create_test_hub();
        let owner = login(&mut hub, "owner", "rust");
        let a = login(&mut hub, "a", "rust");
        hub.logout(owner);

        // when (操作):
        let effects = hub.chat(a, "anyone?".to_string(), Timestamp::new(1000));

        // then (期待する結果):
        assert!(effects.is_empty());
    }
}
