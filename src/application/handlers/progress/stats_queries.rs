//! Read handlers for player stats and the achievement catalog.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::progression::{AchievementId, PlayerStats, CATALOG};
use crate::ports::{AchievementRepository, GameResult, GameResultRepository, PlayerStatsRepository};

pub const RECENT_GAMES_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub stats: PlayerStats,
    pub achievements: Vec<AchievementId>,
    pub recent_games: Vec<GameResult>,
}

pub struct GetPlayerProfileHandler {
    stats: Arc<dyn PlayerStatsRepository>,
    achievements: Arc<dyn AchievementRepository>,
    games: Arc<dyn GameResultRepository>,
}

impl GetPlayerProfileHandler {
    pub fn new(
        stats: Arc<dyn PlayerStatsRepository>,
        achievements: Arc<dyn AchievementRepository>,
        games: Arc<dyn GameResultRepository>,
    ) -> Self {
        Self {
            stats,
            achievements,
            games,
        }
    }

    /// The caller's own profile. A first visit creates the stats row.
    pub async fn mine(&self, user_id: &UserId, display_name: &str) -> Result<PlayerProfile, DomainError> {
        let stats = match self.stats.find(user_id).await? {
            Some(stats) => stats,
            None => {
                let fresh = PlayerStats::new(user_id.clone(), display_name);
                self.stats.upsert(&fresh).await?;
                fresh
            }
        };
        self.profile(stats).await
    }

    /// Someone else's profile; players who never played are not found.
    pub async fn public(&self, user_id: &UserId) -> Result<PlayerProfile, DomainError> {
        let stats = self
            .stats
            .find(user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "No stats for this player"))?;
        self.profile(stats).await
    }

    async fn profile(&self, stats: PlayerStats) -> Result<PlayerProfile, DomainError> {
        let mut achievements: Vec<AchievementId> = self
            .achievements
            .unlocked_for(&stats.user_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        achievements.sort();
        let recent_games = self
            .games
            .recent_for_user(&stats.user_id, RECENT_GAMES_LIMIT)
            .await?;
        Ok(PlayerProfile {
            stats,
            achievements,
            recent_games,
        })
    }
}

/// One catalog entry as seen by a particular player.
#[derive(Debug, Clone)]
pub struct AchievementView {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    pub xp_reward: u64,
    pub unlocked_at: Option<Timestamp>,
}

pub struct ListAchievementsHandler {
    achievements: Arc<dyn AchievementRepository>,
}

impl ListAchievementsHandler {
    pub fn new(achievements: Arc<dyn AchievementRepository>) -> Self {
        Self { achievements }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<Vec<AchievementView>, DomainError> {
        let unlocked = self.achievements.unlocked_for(user_id).await?;
        Ok(CATALOG
            .iter()
            .map(|a| AchievementView {
                id: a.id,
                title: a.title,
                description: a.description,
                xp_reward: a.xp_reward,
                unlocked_at: unlocked.iter().find(|u| u.id == a.id).map(|u| u.unlocked_at),
            })
            .collect())
    }
}
