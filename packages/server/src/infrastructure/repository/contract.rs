//! 全ての MessageStore 実装が満たすべき振る舞いのテスト
//!
//! 各実装のテストモジュールから自分のストアを渡して呼び出す。

use crate::domain::{
    ChatMessage, MessageContent, MessageStore, Nickname, RoomName, Timestamp,
};

pub fn room_name(value: &str) -> RoomName {
    RoomName::new(value.to_string()).unwrap()
}

pub fn message(room: &str, content: &str, time: i64) -> ChatMessage {
    ChatMessage::new(
        room_name(room),
        Nickname::new("alice".to_string()).unwrap(),
        MessageContent::new(content.to_string()).unwrap(),
        Timestamp::new(time),
    )
}

pub async fn fetch_recent_is_oldest_first_and_room_scoped(store: &dyn MessageStore) {
    // テスト項目: 履歴は部屋ごとに分かれ、古い順で返る
    // given (前提条件):
    store.append_message(message("rust", "one", 1)).await.unwrap();
    store.append_message(message("lobby", "other", 2)).await.unwrap();
    store.append_message(message("rust", "two", 3)).await.unwrap();

    // when (操作):
    let history = store.fetch_recent(&room_name("rust"), 100).await.unwrap();

    // then (期待する結果):
    assert_eq!(history, vec![message("rust", "one", 1), message("rust", "two", 3)]);
}

pub async fn fetch_recent_keeps_last_messages(store: &dyn MessageStore) {
    // テスト項目: 件数の上限を超える場合は最新のメッセージが古い順で返る
    // given (前提条件):
    for time in 1..=5 {
        store
            .append_message(message("rust", &format!("m{}", time), time))
            .await
            .unwrap();
    }

    // when (操作):
    let history = store.fetch_recent(&room_name("rust"), 2).await.unwrap();

    // then (期待する結果):
    assert_eq!(history, vec![message("rust", "m4", 4), message("rust", "m5", 5)]);
}

pub async fn purge_room_removes_only_that_room(store: &dyn MessageStore) {
    // テスト項目: 部屋の履歴削除は他の部屋に影響しない
    // given (前提条件):
    store.append_message(message("rust", "one", 1)).await.unwrap();
    store.append_message(message("lobby", "other", 2)).await.unwrap();

    // when (操作):
    store.purge_room(&room_name("rust")).await.unwrap();

    // then (期待する結果):
    assert!(store.fetch_recent(&room_name("rust"), 100).await.unwrap().is_empty());
    assert_eq!(
        store.fetch_recent(&room_name("lobby"), 100).await.unwrap(),
        vec![message("lobby", "other", 2)]
    );
}

pub async fn unknown_room_has_empty_history(store: &dyn MessageStore) {
    // テスト項目: メッセージの無い部屋の履歴は空
    // given (前提条件):

    // when (操作):
    let history = store.fetch_recent(&room_name("nowhere"), 100).await.unwrap();

    // then (期待する結果):
    assert!(history.is_empty());
}
