//! Conversion logic between DTOs and domain types.

use crate::domain::{ChatMessage, InboundMessage, RoomSummary, RoomUserCount, ServerEvent};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl From<dto::ClientMessageDto> for InboundMessage {
    fn from(dto: dto::ClientMessageDto) -> Self {
        match dto {
            dto::ClientMessageDto::Login { nickname, room } => Self::Login { nickname, room },
            dto::ClientMessageDto::Chat { content, .. } => Self::Chat { content },
            dto::ClientMessageDto::Logout => Self::Logout,
            dto::ClientMessageDto::Join { room } => Self::Join { room },
            dto::ClientMessageDto::Unknown => Self::Unknown,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ChatMessage> for dto::HistoryEntryDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            nickname: model.nickname.to_string(),
            content: model.content.as_str().to_string(),
            time: model.time.value(),
        }
    }
}

impl From<&RoomUserCount> for dto::RoomUserCountDto {
    fn from(model: &RoomUserCount) -> Self {
        Self {
            name: model.name.to_string(),
            count: model.count,
        }
    }
}

impl From<&ServerEvent> for dto::ServerMessageDto {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::History { entries } => Self::History {
                history: entries.iter().map(Into::into).collect(),
            },
            ServerEvent::Chat(message) => Self::Chat {
                nickname: message.nickname.to_string(),
                content: message.content.as_str().to_string(),
                time: message.time.value(),
                room: message.room.to_string(),
            },
            ServerEvent::Users { users } => Self::Users {
                users: users.iter().map(ToString::to_string).collect(),
            },
            ServerEvent::Notice { room, notice } => Self::Notice {
                room: room.to_string(),
                notice: notice.clone(),
            },
            ServerEvent::Kicked { room } => Self::Kicked {
                room: room.to_string(),
            },
            ServerEvent::RoomDeleted { room } => Self::RoomDeleted {
                room: room.to_string(),
            },
            ServerEvent::OwnerChanged { room, new_owner } => Self::OwnerChanged {
                room: room.to_string(),
                new_owner: new_owner.to_string(),
            },
            ServerEvent::RoomUserCounts { counts } => Self::RoomUserCounts {
                room_user_counts: counts.iter().map(Into::into).collect(),
            },
            ServerEvent::LoginError { error } => Self::LoginError {
                error: error.clone(),
            },
        }
    }
}

impl From<RoomSummary> for http::RoomDto {
    fn from(model: RoomSummary) -> Self {
        let owner = model.owner.into_string();
        Self {
            name: model.name.into_string(),
            creator: owner.clone(),
            owner,
            notice: model.notice,
            user_count: model.member_count,
        }
    }
}
