//! UseCase: 部屋一覧の取得とニックネームの事前確認
//!
//! どちらもハブを読むだけで、Effect は発生しない。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ChatHub, DirectoryError, RoomSummary};

/// 部屋一覧取得のユースケース
pub struct GetRoomsUseCase {
    hub: Arc<Mutex<ChatHub>>,
}

impl GetRoomsUseCase {
    pub fn new(hub: Arc<Mutex<ChatHub>>) -> Self {
        Self { hub }
    }

    /// 全ての部屋を現在の在室人数付きで返す（デフォルトルームが先頭）
    pub async fn execute(&self) -> Vec<RoomSummary> {
        let hub = self.hub.lock().await;
        hub.list_rooms()
    }
}

/// ニックネーム事前確認のユースケース
///
/// 結果は参考情報で、実際の登録はログイン時に改めて判定される。
pub struct CheckNicknameUseCase {
    hub: Arc<Mutex<ChatHub>>,
}

impl CheckNicknameUseCase {
    pub fn new(hub: Arc<Mutex<ChatHub>>) -> Self {
        Self { hub }
    }

    pub async fn execute(&self, nickname: &str) -> Result<(), DirectoryError> {
        let hub = self.hub.lock().await;
        hub.check_nickname(nickname)
    }
}
