//! Response bodies for stats, leaderboard and achievement endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::progress::{AchievementView, LeaderboardEntry, PlayerProfile};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::progression::{AchievementId, PlayerStats, RankTier};
use crate::ports::GameResult;

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<u32>,
}

/// Stats with the derived level and tier filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub user_id: UserId,
    pub display_name: String,
    pub total_xp: u64,
    pub level: u32,
    pub rank_tier: RankTier,
    pub xp_to_next_tier: Option<u64>,
    pub games_played: u32,
    pub games_won: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub best_score: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
}

impl From<&PlayerStats> for StatsResponse {
    fn from(stats: &PlayerStats) -> Self {
        Self {
            user_id: stats.user_id.clone(),
            display_name: stats.display_name.clone(),
            total_xp: stats.total_xp,
            level: stats.level(),
            rank_tier: stats.rank_tier(),
            xp_to_next_tier: stats.xp_to_next_tier(),
            games_played: stats.games_played,
            games_won: stats.games_won,
            questions_answered: stats.questions_answered,
            correct_answers: stats.correct_answers,
            accuracy: stats.accuracy(),
            best_score: stats.best_score,
            current_streak: stats.current_streak,
            longest_streak: stats.longest_streak,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub stats: StatsResponse,
    pub achievements: Vec<AchievementId>,
    pub recent_games: Vec<GameResult>,
}

impl From<&PlayerProfile> for ProfileResponse {
    fn from(profile: &PlayerProfile) -> Self {
        Self {
            stats: StatsResponse::from(&profile.stats),
            achievements: profile.achievements.clone(),
            recent_games: profile.recent_games.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntryResponse {
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub total_xp: u64,
    pub level: u32,
    pub rank_tier: RankTier,
    pub games_played: u32,
    pub games_won: u32,
}

impl From<&LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            user_id: entry.stats.user_id.clone(),
            display_name: entry.stats.display_name.clone(),
            total_xp: entry.stats.total_xp,
            level: entry.stats.level(),
            rank_tier: entry.stats.rank_tier(),
            games_played: entry.stats.games_played,
            games_won: entry.stats.games_won,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementResponse {
    pub id: AchievementId,
    pub title: String,
    pub description: String,
    pub xp_reward: u64,
    pub unlocked: bool,
    pub unlocked_at: Option<Timestamp>,
}

impl From<&AchievementView> for AchievementResponse {
    fn from(view: &AchievementView) -> Self {
        Self {
            id: view.id,
            title: view.title.to_string(),
            description: view.description.to_string(),
            xp_reward: view.xp_reward,
            unlocked: view.unlocked_at.is_some(),
            unlocked_at: view.unlocked_at,
        }
    }
}
