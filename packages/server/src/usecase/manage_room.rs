//! UseCase: 部屋の管理操作（作成・削除・オーナー移譲・公告・キック）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ManageRoomUseCase の各操作と、その結果として接続に届くフレーム
//!
//! ### なぜこのテストが必要か
//! - 管理 API はセッションを持たないため、操作者のニックネームの扱いを確認する
//! - キックされた接続の送信チャンネルが閉じられることを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：作成、削除、移譲、公告、キック
//! - 異常系：オーナー以外による操作、不正なニックネーム

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ChatHub, Nickname, ValueError};

use super::{dispatcher::Dispatcher, error::ManageRoomError};

/// 部屋の管理操作のユースケース
pub struct ManageRoomUseCase {
    hub: Arc<Mutex<ChatHub>>,
    dispatcher: Arc<Dispatcher>,
}

impl ManageRoomUseCase {
    pub fn new(hub: Arc<Mutex<ChatHub>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { hub, dispatcher }
    }

    /// 部屋を作成する。作成者が無い場合は `unknown` の所有になる
    pub async fn create(&self, name: &str, creator: Option<&str>) -> Result<(), ManageRoomError> {
        let creator = match creator.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => requester(raw)?,
            None => Nickname::unknown(),
        };
        let mut hub = self.hub.lock().await;
        let effects = hub.create_room(name, &creator)?;
        self.dispatcher.dispatch(effects).await;
        Ok(())
    }

    pub async fn delete(&self, name: &str, creator: &str) -> Result<(), ManageRoomError> {
        let creator = requester(creator)?;
        let mut hub = self.hub.lock().await;
        let effects = hub.delete_room(name, &creator)?;
        self.dispatcher.dispatch(effects).await;
        Ok(())
    }

    pub async fn transfer(&self, name: &str, from: &str, to: &str) -> Result<(), ManageRoomError> {
        let from = requester(from)?;
        let to = requester(to)?;
        let mut hub = self.hub.lock().await;
        let effects = hub.transfer_owner(name, &from, to)?;
        self.dispatcher.dispatch(effects).await;
        Ok(())
    }

    /// 公告を設定する。`None` は公告の消去
    pub async fn set_notice(
        &self,
        name: &str,
        creator: &str,
        notice: Option<String>,
    ) -> Result<(), ManageRoomError> {
        let creator = requester(creator)?;
        let mut hub = self.hub.lock().await;
        let effects = hub.set_notice(name, &creator, notice.unwrap_or_default())?;
        self.dispatcher.dispatch(effects).await;
        Ok(())
    }

    pub async fn kick(&self, name: &str, creator: &str, target: &str) -> Result<(), ManageRoomError> {
        let creator = requester(creator)?;
        let target = requester(target)?;
        let mut hub = self.hub.lock().await;
        let effects = hub.kick(name, &creator, &target)?;
        self.dispatcher.dispatch(effects).await;
        Ok(())
    }
}

fn requester(raw: &str) -> Result<Nickname, ValueError> {
    Nickname::new(raw.to_string())
}
