use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::quiz::StartQuizRequest;
use crate::adapters::http::state::AppState;
use crate::application::handlers::rooms::{
    CreateRoomCommand, JoinRoomCommand, SetReadyCommand, StartGameCommand,
};
use crate::domain::foundation::RoomId;

use super::dto::{
    CreateRoomRequest, JoinRoomRequest, ListRoomsQuery, RoomResponse, SetReadyRequest,
    StartGameResponse,
};

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateRoomCommand {
        host_id: auth.0.id.clone(),
        host_name: auth.display_name(),
        name: req.name,
        topic: req.topic,
        max_players: req.max_players,
        is_private: req.is_private,
    };
    let room = state.create_room_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(RoomResponse::from(&room))))
}

/// GET /api/rooms
///
/// Public rooms that are still waiting for players.
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<ListRoomsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rooms = state.list_rooms_handler().handle(query.limit).await?;
    let body: Vec<RoomResponse> = rooms.iter().map(RoomResponse::from).collect();
    Ok(Json(body))
}

/// POST /api/rooms/join
pub async fn join_room(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<JoinRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = JoinRoomCommand {
        code: req.code,
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
    };
    let room = state.join_room_handler().handle(cmd).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// GET /api/rooms/:id
pub async fn get_room(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(room_id): Path<RoomId>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state.get_room_handler().handle(&room_id).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// POST /api/rooms/:id/leave
pub async fn leave_room(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(room_id): Path<RoomId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.leave_room_handler().handle(&room_id, &user.id).await?;
    Ok(Json(RoomResponse::from(&result.room)))
}

/// POST /api/rooms/:id/ready
pub async fn set_ready(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(room_id): Path<RoomId>,
    Json(req): Json<SetReadyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = SetReadyCommand {
        room_id,
        user_id: user.id,
        ready: req.ready,
    };
    let room = state.set_ready_handler().handle(cmd).await?;
    Ok(Json(RoomResponse::from(&room)))
}

/// POST /api/rooms/:id/start
pub async fn start_game(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(room_id): Path<RoomId>,
    body: Option<Json<StartQuizRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let cmd = StartGameCommand {
        room_id,
        user_id: user.id,
        topic: req.topic,
        question_ids: req.question_ids,
        count: req.count,
        time_limit_secs: req.time_limit_secs,
    };
    let game = state.start_game_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(StartGameResponse::from(&game))))
}
