//! JoinRoomHandler - takes a seat using a join code.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, ShareCode, UserId};
use crate::domain::room::{JoinOutcome, Room, RoomPlayer, JOIN_CODE_LEN};
use crate::ports::RoomRepository;

use super::load_room;

#[derive(Debug, Clone)]
pub struct JoinRoomCommand {
    pub code: String,
    pub user_id: UserId,
    pub display_name: String,
}

pub struct JoinRoomHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl JoinRoomHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// Joining a room you're already in returns it unchanged.
    ///
    /// The capacity check here is advisory; the repository's conditional
    /// insert is what keeps concurrent joins from overfilling the room.
    pub async fn handle(&self, cmd: JoinRoomCommand) -> Result<Room, DomainError> {
        let code = ShareCode::parse(&cmd.code, JOIN_CODE_LEN)?;
        let room = self
            .rooms
            .find_by_code(&code)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::RoomNotFound, "No room with that code"))?;

        if room.check_joinable(&cmd.user_id)? == JoinOutcome::AlreadyPresent {
            return Ok(room);
        }

        self.rooms
            .add_player(room.id(), &RoomPlayer::new(cmd.user_id.clone(), cmd.display_name))
            .await?;
        tracing::info!(room_id = %room.id(), user_id = %cmd.user_id, "Player joined room");

        load_room(self.rooms.as_ref(), room.id()).await
    }
}
