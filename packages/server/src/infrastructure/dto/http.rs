//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

/// Room entry of `GET /api/rooms`.
///
/// `creator` repeats `owner` for clients written against the older field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDto {
    pub name: String,
    pub owner: String,
    pub creator: String,
    pub notice: String,
    #[serde(rename = "userCount")]
    pub user_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomDto>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeleteRoomRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransferOwnerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SetNoticeRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KickRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub target: String,
}

/// Outcome of an admin mutation. Always sent with status 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            msg: None,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: Some(msg.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckNicknameQuery {
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckNicknameResponse {
    pub available: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Server time in RFC 3339, UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}
