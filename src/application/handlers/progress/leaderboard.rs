//! XP leaderboards with dense ranking.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::progression::PlayerStats;
use crate::ports::PlayerStatsRepository;

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 25;
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

/// Sorts by XP descending and assigns dense ranks: equal XP shares a rank.
pub fn rank_by_xp(mut players: Vec<PlayerStats>) -> Vec<LeaderboardEntry> {
    players.sort_by(|a, b| {
        b.total_xp
            .cmp(&a.total_xp)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    let mut entries = Vec::with_capacity(players.len());
    let mut rank = 0;
    let mut previous_xp = None;
    for stats in players {
        if previous_xp != Some(stats.total_xp) {
            rank += 1;
            previous_xp = Some(stats.total_xp);
        }
        entries.push(LeaderboardEntry { rank, stats });
    }
    entries
}

pub struct LeaderboardHandler {
    stats: Arc<dyn PlayerStatsRepository>,
}

impl LeaderboardHandler {
    pub fn new(stats: Arc<dyn PlayerStatsRepository>) -> Self {
        Self { stats }
    }

    pub async fn handle(&self, limit: Option<u32>) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        if !(1..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
            return Err(DomainError::validation(
                "limit",
                format!("limit must be between 1 and {}", MAX_LEADERBOARD_LIMIT),
            ));
        }
        let top = self.stats.top_by_xp(limit).await?;
        Ok(rank_by_xp(top))
    }
}
