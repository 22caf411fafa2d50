//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{
    check_nickname, create_room, delete_room, get_rooms, health_check, kick_member, set_notice,
    transfer_owner,
};
pub use websocket::websocket_handler;
