//! LeaveRoomHandler - gives up a seat, handing off host duty if needed.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, RoomId, UserId};
use crate::domain::room::{LeaveOutcome, Room};
use crate::ports::RoomRepository;

use super::load_room;

#[derive(Debug, Clone)]
pub struct LeaveRoomResult {
    pub room: Room,
    pub outcome: LeaveOutcome,
}

pub struct LeaveRoomHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl LeaveRoomHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, room_id: &RoomId, user_id: &UserId) -> Result<LeaveRoomResult, DomainError> {
        let mut room = load_room(self.rooms.as_ref(), room_id).await?;
        let outcome = room.leave(user_id)?;

        self.rooms.remove_player(room_id, user_id).await?;
        match &outcome {
            LeaveOutcome::Left => {}
            LeaveOutcome::HostTransferred(next) => {
                self.rooms.update(&room).await?;
                tracing::info!(room_id = %room_id, new_host = %next, "Room host transferred");
            }
            LeaveOutcome::Closed => {
                self.rooms.update(&room).await?;
                tracing::info!(room_id = %room_id, "Last player left, room finished");
            }
        }

        Ok(LeaveRoomResult { room, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRoomRepository;
    use crate::domain::room::{RoomPlayer, RoomStatus};

    async fn seeded(repo: &InMemoryRoomRepository) -> Room {
        let room = Room::create(
            RoomPlayer::new(UserId::new("host").unwrap(), "Host"),
            "Lobby",
            None,
            None,
            false,
        )
        .unwrap();
        repo.save(&room).await.unwrap();
        repo.add_player(room.id(), &RoomPlayer::new(UserId::new("p1").unwrap(), "P1"))
            .await
            .unwrap();
        room
    }

    #[tokio::test]
    async fn host_leaving_promotes_the_next_player() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let room = seeded(&repo).await;
        let handler = LeaveRoomHandler::new(repo.clone());

        let result = handler.handle(room.id(), &UserId::new("host").unwrap()).await.unwrap();

        let p1 = UserId::new("p1").unwrap();
        assert_eq!(result.outcome, LeaveOutcome::HostTransferred(p1.clone()));
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.host_id(), &p1);
        assert_eq!(stored.current_players(), 1);
    }

    #[tokio::test]
    async fn last_player_out_finishes_the_room() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let room = seeded(&repo).await;
        let handler = LeaveRoomHandler::new(repo.clone());

        handler.handle(room.id(), &UserId::new("p1").unwrap()).await.unwrap();
        let result = handler.handle(room.id(), &UserId::new("host").unwrap()).await.unwrap();

        assert_eq!(result.outcome, LeaveOutcome::Closed);
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RoomStatus::Finished);
    }
}
