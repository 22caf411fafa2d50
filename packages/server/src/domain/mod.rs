//! Domain 層: 部屋・セッション・プレゼンスの中核
//!
//! ここにあるものは全て同期的で I/O を持たない。[`ChatHub`] が唯一の直列化ドメインで、
//! 各操作はディレクトリ・部屋のレジストリ・セッション表をまとめて更新し、
//! 外側の層が実行すべき [`Effect`] を返す。

pub mod broadcast;
pub mod directory;
pub mod effect;
pub mod entity;
pub mod error;
pub mod event;
pub mod hub;
pub mod membership;
pub mod moderation;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod session;
pub mod value_object;

pub use directory::Directory;
pub use effect::Effect;
pub use entity::{ChatMessage, Room, RoomSummary};
pub use error::{DirectoryError, MessagePushError, RepositoryError, RoomError, ValueError};
pub use event::{InboundMessage, RoomUserCount, ServerEvent};
pub use hub::{Binding, ChatHub, SessionState};
pub use pusher::{MessagePusher, OutboundFrame, PusherChannel};
pub use registry::RoomRegistry;
pub use repository::MessageStore;
pub use value_object::{ConnectionId, MessageContent, Nickname, RoomName, Timestamp};
