//! In-memory room store.
//!
//! `add_player` and `start` each run their check and their write under one
//! write lock, which gives them the same guarantee as the conditional
//! updates in the Postgres adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, QuizSessionId, RoomId, ShareCode, Timestamp, UserId};
use crate::domain::room::{Room, RoomPlayer, RoomStatus};
use crate::ports::RoomRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryRoomRepository {
    rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::RoomNotFound, "Room not found")
}

/// `room`'s own fields with a replacement player list.
fn with_players(room: &Room, players: Vec<RoomPlayer>) -> Room {
    Room::reconstitute(
        *room.id(),
        room.code().clone(),
        room.host_id().clone(),
        room.name().to_string(),
        room.topic().map(str::to_string),
        room.max_players(),
        room.status(),
        room.is_private(),
        players,
        room.quiz_session_id().copied(),
        *room.created_at(),
        Timestamp::now(),
    )
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn save(&self, room: &Room) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        if rooms.values().any(|r| r.code() == room.code()) {
            return Err(DomainError::new(ErrorCode::Conflict, "Join code already in use"));
        }
        rooms.insert(*room.id(), room.clone());
        Ok(())
    }

    async fn update(&self, room: &Room) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        let stored = rooms.get(room.id()).ok_or_else(not_found)?;
        let merged = with_players(room, stored.players().to_vec());
        rooms.insert(*room.id(), merged);
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
        Ok(self.rooms.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &ShareCode) -> Result<Option<Room>, DomainError> {
        let rooms = self.rooms.read().await;
        Ok(rooms.values().find(|r| r.code() == code).cloned())
    }

    async fn list_joinable(&self, limit: u32) -> Result<Vec<Room>, DomainError> {
        let rooms = self.rooms.read().await;
        let mut open: Vec<Room> = rooms
            .values()
            .filter(|r| r.status() == RoomStatus::Waiting && !r.is_private() && !r.is_full())
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        open.truncate(limit as usize);
        Ok(open)
    }

    async fn add_player(&self, room_id: &RoomId, player: &RoomPlayer) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or_else(not_found)?;
        room.join(player.clone())?;
        Ok(())
    }

    async fn start(&self, room_id: &RoomId, host_id: &UserId, session_id: &QuizSessionId) -> Result<Room, DomainError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_id).ok_or_else(not_found)?;
        room.start(host_id, *session_id)?;
        Ok(room.clone())
    }

    async fn remove_player(&self, room_id: &RoomId, user_id: &UserId) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get(room_id).ok_or_else(not_found)?;
        let remaining: Vec<RoomPlayer> = room
            .players()
            .iter()
            .filter(|p| &p.user_id != user_id)
            .cloned()
            .collect();
        let updated = with_players(room, remaining);
        rooms.insert(*room_id, updated);
        Ok(())
    }

    async fn set_ready(&self, room_id: &RoomId, user_id: &UserId, ready: bool) -> Result<(), DomainError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get(room_id).ok_or_else(not_found)?;
        let players: Vec<RoomPlayer> = room
            .players()
            .iter()
            .cloned()
            .map(|mut p| {
                if &p.user_id == user_id {
                    p.is_ready = ready;
                }
                p
            })
            .collect();
        let updated = with_players(room, players);
        rooms.insert(*room_id, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> RoomPlayer {
        RoomPlayer::new(UserId::new(id).unwrap(), id.to_uppercase())
    }

    async fn stored_room(repo: &InMemoryRoomRepository, max_players: u32) -> Room {
        let room = Room::create(player("host"), "Trivia night", None, Some(max_players), false).unwrap();
        repo.save(&room).await.unwrap();
        room
    }

    #[tokio::test]
    async fn join_beyond_capacity_is_rejected() {
        let repo = InMemoryRoomRepository::new();
        let room = stored_room(&repo, 2).await;

        repo.add_player(room.id(), &player("p2")).await.unwrap();
        let err = repo.add_player(room.id(), &player("p3")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::RoomFull);
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_players(), 2);
    }

    #[tokio::test]
    async fn concurrent_joins_never_exceed_capacity() {
        let repo = InMemoryRoomRepository::new();
        let room = stored_room(&repo, 5).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = repo.clone();
            let room_id = *room.id();
            handles.push(tokio::spawn(async move {
                repo.add_player(&room_id, &player(&format!("p{}", i))).await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => joined += 1,
                Err(err) => assert_eq!(err.code, ErrorCode::RoomFull),
            }
        }

        assert_eq!(joined, 4);
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.current_players(), 5);
    }

    #[tokio::test]
    async fn start_freezes_the_seats_and_only_succeeds_once() {
        let repo = InMemoryRoomRepository::new();
        let room = stored_room(&repo, 4).await;
        repo.add_player(room.id(), &player("p2")).await.unwrap();
        let host = UserId::new("host").unwrap();

        let started = repo.start(room.id(), &host, &QuizSessionId::new()).await.unwrap();
        assert_eq!(started.status(), RoomStatus::InProgress);
        assert_eq!(started.current_players(), 2);

        let err = repo.start(room.id(), &host, &QuizSessionId::new()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        let err = repo.add_player(room.id(), &player("late")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RoomNotJoinable);

        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.quiz_session_id(), started.quiz_session_id());
        assert_eq!(stored.current_players(), 2);
    }

    #[tokio::test]
    async fn update_keeps_seats_taken_since_load() {
        let repo = InMemoryRoomRepository::new();
        let mut room = stored_room(&repo, 4).await;

        repo.add_player(room.id(), &player("late")).await.unwrap();
        room.finish();
        repo.update(&room).await.unwrap();

        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RoomStatus::Finished);
        assert_eq!(stored.current_players(), 2);
    }

    #[tokio::test]
    async fn private_and_started_rooms_are_not_listed() {
        let repo = InMemoryRoomRepository::new();
        let open = stored_room(&repo, 4).await;
        let hidden = Room::create(player("h2"), "Secret", None, None, true).unwrap();
        repo.save(&hidden).await.unwrap();

        let listed = repo.list_joinable(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), open.id());
    }

    #[tokio::test]
    async fn ready_flag_and_removal_are_persisted() {
        let repo = InMemoryRoomRepository::new();
        let room = stored_room(&repo, 4).await;
        repo.add_player(room.id(), &player("p2")).await.unwrap();

        let p2 = UserId::new("p2").unwrap();
        repo.set_ready(room.id(), &p2, true).await.unwrap();
        let stored = repo.find_by_code(room.code()).await.unwrap().unwrap();
        assert!(stored.players().iter().any(|p| p.user_id == p2 && p.is_ready));

        repo.remove_player(room.id(), &p2).await.unwrap();
        let stored = repo.find_by_id(room.id()).await.unwrap().unwrap();
        assert!(!stored.has_player(&p2));
    }
}
