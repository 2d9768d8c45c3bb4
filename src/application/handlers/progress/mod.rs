//! Progression handlers - XP bookkeeping, stats, leaderboards and achievements.

mod leaderboard;
mod recorder;
mod stats_queries;

pub use leaderboard::{
    rank_by_xp, LeaderboardEntry, LeaderboardHandler, DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT,
};
pub use recorder::{ProgressRecorder, ProgressUpdate};
pub use stats_queries::{
    AchievementView, GetPlayerProfileHandler, ListAchievementsHandler, PlayerProfile,
    RECENT_GAMES_LIMIT,
};
