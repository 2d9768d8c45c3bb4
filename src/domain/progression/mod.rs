//! Progression module - XP, levels, rank tiers, player stats and achievements.

pub mod achievements;
mod stats;
mod xp;

pub use achievements::{
    unlock_new, Achievement, AchievementContext, AchievementId, UnlockedAchievement, CATALOG,
};
pub use stats::PlayerStats;
pub use xp::{level_for_xp, xp_for_game, GameOutcome, RankTier};
