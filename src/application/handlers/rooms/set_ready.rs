//! SetReadyHandler - toggles a player's ready flag in the lobby.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, RoomId, UserId};
use crate::domain::room::Room;
use crate::ports::RoomRepository;

use super::load_room;

#[derive(Debug, Clone)]
pub struct SetReadyCommand {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub ready: bool,
}

pub struct SetReadyHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl SetReadyHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, cmd: SetReadyCommand) -> Result<Room, DomainError> {
        let mut room = load_room(self.rooms.as_ref(), &cmd.room_id).await?;
        room.set_ready(&cmd.user_id, cmd.ready)?;
        self.rooms.set_ready(&cmd.room_id, &cmd.user_id, cmd.ready).await?;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRoomRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::room::RoomPlayer;

    #[tokio::test]
    async fn only_seated_players_can_ready_up() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let host = UserId::new("host").unwrap();
        let room = Room::create(RoomPlayer::new(host.clone(), "Host"), "Lobby", None, None, false).unwrap();
        repo.save(&room).await.unwrap();
        let handler = SetReadyHandler::new(repo.clone());

        let updated = handler
            .handle(SetReadyCommand {
                room_id: *room.id(),
                user_id: host.clone(),
                ready: true,
            })
            .await
            .unwrap();
        assert!(updated.players()[0].is_ready);
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert!(stored.players()[0].is_ready);

        let err = handler
            .handle(SetReadyCommand {
                room_id: *room.id(),
                user_id: UserId::new("stranger").unwrap(),
                ready: true,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
