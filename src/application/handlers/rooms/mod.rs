//! Room handlers - multiplayer lobbies from creation to game start.

mod create_room;
mod join_room;
mod leave_room;
mod room_queries;
mod set_ready;
mod start_game;

pub use create_room::{CreateRoomCommand, CreateRoomHandler};
pub use join_room::{JoinRoomCommand, JoinRoomHandler};
pub use leave_room::{LeaveRoomHandler, LeaveRoomResult};
pub use room_queries::{GetRoomHandler, ListRoomsHandler, DEFAULT_ROOM_LIST_LIMIT};
pub use set_ready::{SetReadyCommand, SetReadyHandler};
pub use start_game::{StartGameCommand, StartGameHandler, StartedGame};

use crate::domain::foundation::{DomainError, ErrorCode, RoomId};
use crate::domain::room::Room;
use crate::ports::RoomRepository;

pub(crate) async fn load_room(rooms: &dyn RoomRepository, id: &RoomId) -> Result<Room, DomainError> {
    rooms
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::RoomNotFound, "Room not found"))
}
