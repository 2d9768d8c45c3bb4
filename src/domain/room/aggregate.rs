//! Room aggregate - a multiplayer lobby.
//!
//! # Invariants
//!
//! - `players.len() <= max_players`, and `max_players` is within 2..=20
//! - the host is always one of the players while the room is open
//! - players can only join while the room is waiting
//! - a room with no players left is finished

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, QuizSessionId, RoomId, ShareCode, Timestamp, UserId,
};

pub const JOIN_CODE_LEN: usize = 6;
pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 20;
pub const DEFAULT_MAX_PLAYERS: u32 = 8;
pub const MAX_NAME_LENGTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Finished,
}

str_enum!(RoomStatus {
    Waiting => "waiting",
    InProgress => "in_progress",
    Finished => "finished",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlayer {
    pub user_id: UserId,
    pub display_name: String,
    pub is_ready: bool,
    pub joined_at: Timestamp,
}

impl RoomPlayer {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            is_ready: false,
            joined_at: Timestamp::now(),
        }
    }
}

/// Result of a join attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    HostTransferred(UserId),
    /// Last player left.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    code: ShareCode,
    host_id: UserId,
    name: String,
    topic: Option<String>,
    max_players: u32,
    status: RoomStatus,
    is_private: bool,
    players: Vec<RoomPlayer>,
    quiz_session_id: Option<QuizSessionId>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Room {
    /// Opens a new room with the host seated.
    pub fn create(
        host: RoomPlayer,
        name: &str,
        topic: Option<String>,
        max_players: Option<u32>,
        is_private: bool,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Room name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(
                "name",
                format!("Room name cannot exceed {} characters", MAX_NAME_LENGTH),
            ));
        }

        let max_players = max_players.unwrap_or(DEFAULT_MAX_PLAYERS);
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(DomainError::validation(
                "max_players",
                format!("Rooms hold between {} and {} players", MIN_PLAYERS, MAX_PLAYERS),
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: RoomId::new(),
            code: ShareCode::generate(JOIN_CODE_LEN),
            host_id: host.user_id.clone(),
            name: name.to_string(),
            topic: topic.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            max_players,
            status: RoomStatus::Waiting,
            is_private,
            players: vec![host],
            quiz_session_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: RoomId,
        code: ShareCode,
        host_id: UserId,
        name: String,
        topic: Option<String>,
        max_players: u32,
        status: RoomStatus,
        is_private: bool,
        players: Vec<RoomPlayer>,
        quiz_session_id: Option<QuizSessionId>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            code,
            host_id,
            name,
            topic,
            max_players,
            status,
            is_private,
            players,
            quiz_session_id,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn code(&self) -> &ShareCode {
        &self.code
    }

    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    pub fn current_players(&self) -> u32 {
        self.players.len() as u32
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn players(&self) -> &[RoomPlayer] {
        &self.players
    }

    pub fn quiz_session_id(&self) -> Option<&QuizSessionId> {
        self.quiz_session_id.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn has_player(&self, user_id: &UserId) -> bool {
        self.players.iter().any(|p| &p.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.current_players() >= self.max_players
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks whether `user_id` could join right now without changing anything.
    pub fn check_joinable(&self, user_id: &UserId) -> Result<JoinOutcome, DomainError> {
        if self.has_player(user_id) {
            return Ok(JoinOutcome::AlreadyPresent);
        }
        if self.status != RoomStatus::Waiting {
            return Err(DomainError::new(
                ErrorCode::RoomNotJoinable,
                "Room is no longer accepting players",
            ));
        }
        if self.is_full() {
            return Err(DomainError::new(ErrorCode::RoomFull, "Room is full"));
        }
        Ok(JoinOutcome::Joined)
    }

    pub fn join(&mut self, player: RoomPlayer) -> Result<JoinOutcome, DomainError> {
        let outcome = self.check_joinable(&player.user_id)?;
        if outcome == JoinOutcome::Joined {
            self.players.push(player);
            self.touch();
        }
        Ok(outcome)
    }

    /// Removes a player, handing the host role to the earliest remaining joiner.
    ///
    /// Players are kept in join order.
    pub fn leave(&mut self, user_id: &UserId) -> Result<LeaveOutcome, DomainError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.user_id == user_id)
            .ok_or_else(|| DomainError::validation("user_id", "Player is not in this room"))?;

        self.players.remove(index);
        self.touch();

        if self.players.is_empty() {
            self.status = RoomStatus::Finished;
            return Ok(LeaveOutcome::Closed);
        }

        if &self.host_id == user_id {
            let next = self
                .players
                .first()
                .map(|p| p.user_id.clone())
                .ok_or_else(|| DomainError::internal("room has players but no successor"))?;
            self.host_id = next.clone();
            return Ok(LeaveOutcome::HostTransferred(next));
        }

        Ok(LeaveOutcome::Left)
    }

    pub fn set_ready(&mut self, user_id: &UserId, ready: bool) -> Result<(), DomainError> {
        self.ensure_waiting()?;
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.user_id == user_id)
            .ok_or_else(|| DomainError::forbidden("Player is not in this room"))?;
        player.is_ready = ready;
        self.touch();
        Ok(())
    }

    /// Moves the lobby into a running game.
    pub fn start(&mut self, by: &UserId, session_id: QuizSessionId) -> Result<(), DomainError> {
        self.authorize_host(by)?;
        self.ensure_waiting()?;
        if self.current_players() < MIN_PLAYERS {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("At least {} players are needed to start", MIN_PLAYERS),
            ));
        }
        self.status = RoomStatus::InProgress;
        self.quiz_session_id = Some(session_id);
        self.touch();
        Ok(())
    }

    pub fn finish(&mut self) {
        self.status = RoomStatus::Finished;
        self.touch();
    }

    pub fn authorize_host(&self, user_id: &UserId) -> Result<(), DomainError> {
        if &self.host_id == user_id {
            Ok(())
        } else {
            Err(DomainError::forbidden("Only the host can do that"))
        }
    }

    fn ensure_waiting(&self) -> Result<(), DomainError> {
        if self.status == RoomStatus::Waiting {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Room is {}", self.status),
            ))
        }
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn room_with_capacity(max: u32) -> Room {
        Room::create(RoomPlayer::new(user("host"), "Host"), "Friday Trivia", None, Some(max), false)
            .unwrap()
    }

    #[test]
    fn create_seats_host_and_generates_code() {
        let room = room_with_capacity(4);
        assert_eq!(room.current_players(), 1);
        assert_eq!(room.host_id(), &user("host"));
        assert_eq!(room.code().as_str().len(), JOIN_CODE_LEN);
        assert_eq!(room.status(), RoomStatus::Waiting);
    }

    #[test]
    fn capacity_bounds_are_validated() {
        let host = || RoomPlayer::new(user("host"), "Host");
        assert!(Room::create(host(), "Room", None, Some(1), false).is_err());
        assert!(Room::create(host(), "Room", None, Some(21), false).is_err());
        assert!(Room::create(host(), "  ", None, None, false).is_err());
    }

    #[test]
    fn join_stops_at_capacity() {
        let mut room = room_with_capacity(2);
        assert_eq!(room.join(RoomPlayer::new(user("a"), "A")).unwrap(), JoinOutcome::Joined);

        let err = room.join(RoomPlayer::new(user("b"), "B")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoomFull);
        assert_eq!(room.current_players(), 2);
    }

    #[test]
    fn joining_twice_is_idempotent() {
        let mut room = room_with_capacity(4);
        room.join(RoomPlayer::new(user("a"), "A")).unwrap();
        assert_eq!(
            room.join(RoomPlayer::new(user("a"), "A")).unwrap(),
            JoinOutcome::AlreadyPresent
        );
        assert_eq!(room.current_players(), 2);
    }

    #[test]
    fn cannot_join_a_started_room() {
        let mut room = room_with_capacity(4);
        room.join(RoomPlayer::new(user("a"), "A")).unwrap();
        room.start(&user("host"), QuizSessionId::new()).unwrap();

        let err = room.join(RoomPlayer::new(user("b"), "B")).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoomNotJoinable);
    }

    #[test]
    fn host_leaving_promotes_earliest_joiner() {
        let mut room = room_with_capacity(4);
        room.join(RoomPlayer::new(user("a"), "A")).unwrap();
        room.join(RoomPlayer::new(user("b"), "B")).unwrap();

        let outcome = room.leave(&user("host")).unwrap();
        assert_eq!(outcome, LeaveOutcome::HostTransferred(user("a")));
        assert_eq!(room.host_id(), &user("a"));
    }

    #[test]
    fn last_player_leaving_closes_room() {
        let mut room = room_with_capacity(4);
        assert_eq!(room.leave(&user("host")).unwrap(), LeaveOutcome::Closed);
        assert_eq!(room.status(), RoomStatus::Finished);
    }

    #[test]
    fn start_requires_host_and_two_players() {
        let mut room = room_with_capacity(4);
        let err = room.start(&user("host"), QuizSessionId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);

        room.join(RoomPlayer::new(user("a"), "A")).unwrap();
        let err = room.start(&user("a"), QuizSessionId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let session = QuizSessionId::new();
        room.start(&user("host"), session).unwrap();
        assert_eq!(room.status(), RoomStatus::InProgress);
        assert_eq!(room.quiz_session_id(), Some(&session));
    }

    #[test]
    fn ready_flag_only_for_players() {
        let mut room = room_with_capacity(4);
        room.set_ready(&user("host"), true).unwrap();
        assert!(room.players()[0].is_ready);
        assert!(room.set_ready(&user("ghost"), true).is_err());
    }
}
