//! Room repository port.
//!
//! Seat changes go through `add_player` / `remove_player` rather than
//! rewriting the player list, so concurrent joins cannot overwrite each
//! other and the capacity check happens where the counter lives.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, QuizSessionId, RoomId, ShareCode, UserId};
use crate::domain::room::{Room, RoomPlayer};

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Persists a newly created room with its seated players.
    async fn save(&self, room: &Room) -> Result<(), DomainError>;

    /// Persists status, host and quiz session changes.
    ///
    /// Does not touch the player list.
    async fn update(&self, room: &Room) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &RoomId) -> Result<Option<Room>, DomainError>;

    async fn find_by_code(&self, code: &ShareCode) -> Result<Option<Room>, DomainError>;

    /// Public rooms still waiting for players, newest first.
    async fn list_joinable(&self, limit: u32) -> Result<Vec<Room>, DomainError>;

    /// Seats a player if the room is waiting and below capacity.
    ///
    /// # Errors
    ///
    /// - `RoomFull` if `current_players` already equals `max_players`
    /// - `RoomNotJoinable` if the room is no longer waiting
    /// - `RoomNotFound` if the room doesn't exist
    async fn add_player(&self, room_id: &RoomId, player: &RoomPlayer) -> Result<(), DomainError>;

    /// Moves a waiting room into play, pointing it at `session_id`, and
    /// returns it with the players seated at that instant. No seat can be
    /// claimed once this returns, so the returned players are final.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if `host_id` is not the room's host
    /// - `InvalidStateTransition` if the room already started or has too few players
    /// - `RoomNotFound` if the room doesn't exist
    async fn start(&self, room_id: &RoomId, host_id: &UserId, session_id: &QuizSessionId) -> Result<Room, DomainError>;

    /// Removes a player's seat. Removing an absent player is a no-op.
    async fn remove_player(&self, room_id: &RoomId, user_id: &UserId) -> Result<(), DomainError>;

    async fn set_ready(&self, room_id: &RoomId, user_id: &UserId, ready: bool) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RoomRepository) {}
    }
}
