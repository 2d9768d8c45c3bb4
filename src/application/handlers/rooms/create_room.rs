//! CreateRoomHandler - opens a lobby with the caller as host.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::room::{Room, RoomPlayer};
use crate::ports::RoomRepository;

/// Fresh codes to try when the store reports a collision.
const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct CreateRoomCommand {
    pub host_id: UserId,
    pub host_name: String,
    pub name: String,
    pub topic: Option<String>,
    pub max_players: Option<u32>,
    pub is_private: bool,
}

pub struct CreateRoomHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl CreateRoomHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, cmd: CreateRoomCommand) -> Result<Room, DomainError> {
        for _ in 0..CODE_ATTEMPTS {
            let room = Room::create(
                RoomPlayer::new(cmd.host_id.clone(), cmd.host_name.clone()),
                &cmd.name,
                cmd.topic.clone(),
                cmd.max_players,
                cmd.is_private,
            )?;
            match self.rooms.save(&room).await {
                Ok(()) => {
                    tracing::info!(room_id = %room.id(), code = %room.code(), host = %cmd.host_id, "Room created");
                    return Ok(room);
                }
                Err(e) if e.code == ErrorCode::Conflict => {
                    tracing::debug!("Room code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(DomainError::internal("Could not allocate a unique room code"))
    }
}
