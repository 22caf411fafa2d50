//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object discriminated by its `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessageDto {
    Login {
        #[serde(default)]
        nickname: String,
        #[serde(default)]
        room: Option<String>,
    },
    /// `room` is sent by the legacy client but the server always uses the
    /// room the session is bound to.
    Chat {
        #[serde(default)]
        content: String,
        #[serde(default)]
        room: Option<String>,
    },
    Logout,
    Join {
        #[serde(default)]
        room: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ClientMessageDto {
    /// Read a frame field by field. Missing or mistyped fields fall back to
    /// their defaults (empty string, no room) so the hub still sees the
    /// message; only an unknown or missing `type` yields [`Self::Unknown`].
    pub fn from_value(value: &Value) -> Self {
        let text = |field: &str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        match value.get("type").and_then(Value::as_str) {
            Some("login") => Self::Login {
                nickname: text("nickname").unwrap_or_default(),
                room: text("room"),
            },
            Some("chat") => Self::Chat {
                content: text("content").unwrap_or_default(),
                room: text("room"),
            },
            Some("logout") => Self::Logout,
            Some("join") => Self::Join { room: text("room") },
            _ => Self::Unknown,
        }
    }
}

/// One persisted message inside a `history` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryDto {
    pub nickname: String,
    pub content: String,
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUserCountDto {
    pub name: String,
    pub count: usize,
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessageDto {
    History {
        history: Vec<HistoryEntryDto>,
    },
    Chat {
        nickname: String,
        content: String,
        time: i64,
        room: String,
    },
    Users {
        users: Vec<String>,
    },
    Notice {
        room: String,
        notice: String,
    },
    Kicked {
        room: String,
    },
    RoomDeleted {
        room: String,
    },
    OwnerChanged {
        room: String,
        #[serde(rename = "newOwner")]
        new_owner: String,
    },
    RoomUserCounts {
        #[serde(rename = "roomUserCounts")]
        room_user_counts: Vec<RoomUserCountDto>,
    },
    LoginError {
        error: String,
    },
}
