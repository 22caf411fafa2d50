//! Server state shared by every handler.

use std::sync::Arc;

use roomhub_shared::time::Clock;

use crate::{
    infrastructure::codec::WireCodec,
    usecase::{CheckNicknameUseCase, GetRoomsUseCase, ManageRoomUseCase, SessionCoordinator},
};

/// Shared application state
pub struct AppState {
    /// SessionCoordinator（WebSocket セッションのユースケース）
    pub session_coordinator: Arc<SessionCoordinator>,
    /// ManageRoomUseCase（部屋の管理操作のユースケース）
    pub manage_room_usecase: Arc<ManageRoomUseCase>,
    /// GetRoomsUseCase（部屋一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// CheckNicknameUseCase（ニックネーム事前確認のユースケース）
    pub check_nickname_usecase: Arc<CheckNicknameUseCase>,
    /// Decoder of inbound frames
    pub codec: WireCodec,
    pub clock: Arc<dyn Clock>,
}
