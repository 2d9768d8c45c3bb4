//! Clan endpoints: membership, moderation, clan sessions and leaderboard.

mod dto;
mod handlers;
mod routes;

pub use dto::{ClanResponse, LeaveClanResponse};
pub use routes::clan_routes;
