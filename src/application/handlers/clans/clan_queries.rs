//! Clan read handlers.

use std::sync::Arc;

use crate::application::handlers::progress::{rank_by_xp, LeaderboardEntry};
use crate::domain::clan::Clan;
use crate::domain::foundation::{ClanId, DomainError, UserId};
use crate::domain::progression::PlayerStats;
use crate::ports::{ClanRepository, PlayerStatsRepository};

use super::load_clan;

pub struct GetClanHandler {
    clans: Arc<dyn ClanRepository>,
}

impl GetClanHandler {
    pub fn new(clans: Arc<dyn ClanRepository>) -> Self {
        Self { clans }
    }

    pub async fn handle(&self, id: &ClanId) -> Result<Clan, DomainError> {
        load_clan(self.clans.as_ref(), id).await
    }
}

pub struct GetMyClanHandler {
    clans: Arc<dyn ClanRepository>,
}

impl GetMyClanHandler {
    pub fn new(clans: Arc<dyn ClanRepository>) -> Self {
        Self { clans }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<Option<Clan>, DomainError> {
        self.clans.find_by_member(user_id).await
    }
}

/// Members ranked by lifetime XP. Members who never played appear with zero.
pub struct ClanLeaderboardHandler {
    clans: Arc<dyn ClanRepository>,
    stats: Arc<dyn PlayerStatsRepository>,
}

impl ClanLeaderboardHandler {
    pub fn new(clans: Arc<dyn ClanRepository>, stats: Arc<dyn PlayerStatsRepository>) -> Self {
        Self { clans, stats }
    }

    pub async fn handle(&self, id: &ClanId) -> Result<Vec<LeaderboardEntry>, DomainError> {
        let clan = load_clan(self.clans.as_ref(), id).await?;
        let ids: Vec<UserId> = clan.members().iter().map(|m| m.user_id.clone()).collect();
        let known = self.stats.find_by_users(&ids).await?;

        let players = clan
            .members()
            .iter()
            .map(|m| {
                known
                    .iter()
                    .find(|s| s.user_id == m.user_id)
                    .cloned()
                    .unwrap_or_else(|| PlayerStats::new(m.user_id.clone(), m.display_name.clone()))
            })
            .collect();
        Ok(rank_by_xp(players))
    }
}
