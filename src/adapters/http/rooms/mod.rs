//! Multiplayer lobby endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{RoomResponse, StartGameResponse};
pub use routes::room_routes;
