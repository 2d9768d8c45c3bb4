//! Player stats, the global leaderboard and the achievement catalog.

mod dto;
mod handlers;
mod routes;

pub use dto::{AchievementResponse, LeaderboardEntryResponse, ProfileResponse, StatsResponse};
pub use routes::stats_routes;
