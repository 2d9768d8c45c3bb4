//! Room module - multiplayer lobbies with join codes and capacity.

mod aggregate;

pub use aggregate::{
    JoinOutcome, LeaveOutcome, Room, RoomPlayer, RoomStatus, DEFAULT_MAX_PLAYERS, JOIN_CODE_LEN,
    MAX_PLAYERS, MIN_PLAYERS,
};
