//! UseCase 層
//!
//! ハブのロック、Effect の実行、永続化キューをまとめ、
//! UI 層からは操作ごとのユースケースとして見せる。

pub mod dispatcher;
pub mod error;
pub mod get_rooms;
pub mod manage_room;
pub mod persistence;
pub mod session;

pub use dispatcher::Dispatcher;
pub use error::ManageRoomError;
pub use get_rooms::{CheckNicknameUseCase, GetRoomsUseCase};
pub use manage_room::ManageRoomUseCase;
pub use persistence::PersistenceQueue;
pub use session::SessionCoordinator;
