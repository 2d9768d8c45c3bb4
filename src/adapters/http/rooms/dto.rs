//! Request and response bodies for `/api/rooms`.

use serde::{Deserialize, Serialize};

use crate::adapters::http::quiz::SessionResponse;
use crate::application::handlers::rooms::StartedGame;
use crate::domain::foundation::{QuizSessionId, RoomId, Timestamp, UserId};
use crate::domain::room::{Room, RoomPlayer, RoomStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub max_players: Option<u32>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetReadyRequest {
    pub ready: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListRoomsQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: RoomId,
    pub code: String,
    pub host_id: UserId,
    pub name: String,
    pub topic: Option<String>,
    pub max_players: u32,
    pub current_players: u32,
    pub status: RoomStatus,
    pub is_private: bool,
    pub players: Vec<RoomPlayer>,
    pub quiz_session_id: Option<QuizSessionId>,
    pub created_at: Timestamp,
}

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: *room.id(),
            code: room.code().to_string(),
            host_id: room.host_id().clone(),
            name: room.name().to_string(),
            topic: room.topic().map(str::to_string),
            max_players: room.max_players(),
            current_players: room.current_players(),
            status: room.status(),
            is_private: room.is_private(),
            players: room.players().to_vec(),
            quiz_session_id: room.quiz_session_id().copied(),
            created_at: *room.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartGameResponse {
    pub room: RoomResponse,
    pub session: SessionResponse,
}

impl From<&StartedGame> for StartGameResponse {
    fn from(game: &StartedGame) -> Self {
        Self {
            room: RoomResponse::from(&game.room),
            session: SessionResponse::from(&game.session),
        }
    }
}
