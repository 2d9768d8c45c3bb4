//! Room read handlers.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, RoomId};
use crate::domain::room::Room;
use crate::ports::RoomRepository;

use super::load_room;

pub const DEFAULT_ROOM_LIST_LIMIT: u32 = 20;
const MAX_ROOM_LIST_LIMIT: u32 = 100;

pub struct GetRoomHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl GetRoomHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, id: &RoomId) -> Result<Room, DomainError> {
        load_room(self.rooms.as_ref(), id).await
    }
}

/// Public rooms still waiting for players, newest first.
pub struct ListRoomsHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl ListRoomsHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, limit: Option<u32>) -> Result<Vec<Room>, DomainError> {
        let limit = limit
            .unwrap_or(DEFAULT_ROOM_LIST_LIMIT)
            .clamp(1, MAX_ROOM_LIST_LIMIT);
        self.rooms.list_joinable(limit).await
    }
}
