//! HTTP API endpoint handlers.
//!
//! Mutations always answer 200 with `{success, msg?}`; failures are reported
//! in the body, never through the status code.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use roomhub_shared::time::timestamp_to_rfc3339;

use crate::{
    infrastructure::dto::http::{
        CheckNicknameQuery, CheckNicknameResponse, CreateRoomRequest, DeleteRoomRequest,
        HealthResponse, KickRequest, MutationResponse, RoomDto, RoomListResponse,
        SetNoticeRequest, TransferOwnerRequest,
    },
    ui::state::AppState,
    usecase::ManageRoomError,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        time: timestamp_to_rfc3339(state.clock.now_millis()),
    })
}

/// Get list of rooms with their live member counts
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListResponse> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(RoomListResponse {
        rooms: rooms.into_iter().map(RoomDto::from).collect(),
    })
}

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Json<MutationResponse> {
    let result = state
        .manage_room_usecase
        .create(&request.name, request.creator.as_deref())
        .await;
    respond("create room", &request.name, result)
}

pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteRoomRequest>,
) -> Json<MutationResponse> {
    let result = state
        .manage_room_usecase
        .delete(&request.name, &request.creator)
        .await;
    respond("delete room", &request.name, result)
}

pub async fn transfer_owner(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferOwnerRequest>,
) -> Json<MutationResponse> {
    let result = state
        .manage_room_usecase
        .transfer(&request.name, &request.from, &request.to)
        .await;
    respond("transfer owner", &request.name, result)
}

pub async fn set_notice(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetNoticeRequest>,
) -> Json<MutationResponse> {
    let result = state
        .manage_room_usecase
        .set_notice(&request.name, &request.creator, request.notice)
        .await;
    respond("set notice", &request.name, result)
}

pub async fn kick_member(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KickRequest>,
) -> Json<MutationResponse> {
    let result = state
        .manage_room_usecase
        .kick(&request.name, &request.creator, &request.target)
        .await;
    respond("kick", &request.name, result)
}

pub async fn check_nickname(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckNicknameQuery>,
) -> Json<CheckNicknameResponse> {
    let nickname = query.nickname.unwrap_or_default();
    let response = match state.check_nickname_usecase.execute(&nickname).await {
        Ok(()) => CheckNicknameResponse {
            available: true,
            message: "nickname is available".to_string(),
        },
        Err(e) => CheckNicknameResponse {
            available: false,
            message: e.to_string(),
        },
    };
    Json(response)
}

fn respond(
    operation: &str,
    room: &str,
    result: Result<(), ManageRoomError>,
) -> Json<MutationResponse> {
    match result {
        Ok(()) => Json(MutationResponse::ok()),
        Err(e) => {
            tracing::warn!("Failed to {} '{}': {}", operation, room, e);
            Json(MutationResponse::failed(e.to_string()))
        }
    }
}
