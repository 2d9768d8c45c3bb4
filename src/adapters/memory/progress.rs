//! In-memory stats, achievements and game history.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, QuizSessionId, Timestamp, UserId};
use crate::domain::progression::{AchievementId, PlayerStats, UnlockedAchievement};
use crate::ports::{AchievementRepository, GameResult, GameResultRepository, PlayerStatsRepository, SaveResult};

#[derive(Debug, Clone, Default)]
pub struct InMemoryPlayerStatsRepository {
    stats: Arc<RwLock<HashMap<UserId, PlayerStats>>>,
}

impl InMemoryPlayerStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerStatsRepository for InMemoryPlayerStatsRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<PlayerStats>, DomainError> {
        Ok(self.stats.read().await.get(user_id).cloned())
    }

    async fn upsert(&self, stats: &PlayerStats) -> Result<(), DomainError> {
        let mut stored = self.stats.write().await;
        let mut next = stats.clone();
        if let Some(existing) = stored.get(&stats.user_id) {
            next.total_xp = next.total_xp.max(existing.total_xp);
        }
        stored.insert(stats.user_id.clone(), next);
        Ok(())
    }

    async fn top_by_xp(&self, limit: u32) -> Result<Vec<PlayerStats>, DomainError> {
        let stored = self.stats.read().await;
        let mut all: Vec<PlayerStats> = stored.values().cloned().collect();
        all.sort_by(|a, b| b.total_xp.cmp(&a.total_xp).then_with(|| a.user_id.cmp(&b.user_id)));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn find_by_users(&self, user_ids: &[UserId]) -> Result<Vec<PlayerStats>, DomainError> {
        let stored = self.stats.read().await;
        Ok(user_ids.iter().filter_map(|id| stored.get(id).cloned()).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAchievementRepository {
    unlocked: Arc<RwLock<HashMap<UserId, Vec<UnlockedAchievement>>>>,
}

impl InMemoryAchievementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AchievementRepository for InMemoryAchievementRepository {
    async fn unlocked_for(&self, user_id: &UserId) -> Result<Vec<UnlockedAchievement>, DomainError> {
        Ok(self
            .unlocked
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record(
        &self,
        user_id: &UserId,
        ids: &[AchievementId],
        unlocked_at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut unlocked = self.unlocked.write().await;
        let entries = unlocked.entry(user_id.clone()).or_default();
        for id in ids {
            if !entries.iter().any(|u| u.id == *id) {
                entries.push(UnlockedAchievement {
                    id: *id,
                    unlocked_at,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryGameResultRepository {
    results: Arc<RwLock<Vec<GameResult>>>,
}

impl InMemoryGameResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameResultRepository for InMemoryGameResultRepository {
    async fn claim(&self, result: &GameResult) -> Result<SaveResult, DomainError> {
        let mut stored = self.results.write().await;
        let exists = stored
            .iter()
            .any(|r| r.session_id == result.session_id && r.user_id == result.user_id);
        if exists {
            return Ok(SaveResult::AlreadyExists);
        }
        stored.push(result.clone());
        Ok(SaveResult::Inserted)
    }

    async fn release(&self, session_id: &QuizSessionId, user_id: &UserId) -> Result<(), DomainError> {
        self.results
            .write()
            .await
            .retain(|r| !(&r.session_id == session_id && &r.user_id == user_id));
        Ok(())
    }

    async fn for_session(&self, session_id: &QuizSessionId) -> Result<Vec<GameResult>, DomainError> {
        let stored = self.results.read().await;
        Ok(stored.iter().filter(|r| &r.session_id == session_id).cloned().collect())
    }

    async fn recent_for_user(&self, user_id: &UserId, limit: u32) -> Result<Vec<GameResult>, DomainError> {
        let stored = self.results.read().await;
        Ok(stored
            .iter()
            .rev()
            .filter(|r| &r.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quiz::QuizMode;

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn upsert_never_lowers_xp() {
        let repo = InMemoryPlayerStatsRepository::new();
        let mut stats = PlayerStats::new(uid("p1"), "P1");
        stats.total_xp = 500;
        repo.upsert(&stats).await.unwrap();

        stats.total_xp = 100;
        stats.games_played = 3;
        repo.upsert(&stats).await.unwrap();

        let stored = repo.find(&uid("p1")).await.unwrap().unwrap();
        assert_eq!(stored.total_xp, 500);
        assert_eq!(stored.games_played, 3);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_xp_then_id() {
        let repo = InMemoryPlayerStatsRepository::new();
        for (id, xp) in [("b", 100), ("a", 100), ("c", 300)] {
            let mut stats = PlayerStats::new(uid(id), id);
            stats.total_xp = xp;
            repo.upsert(&stats).await.unwrap();
        }

        let top: Vec<String> = repo
            .top_by_xp(10)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.user_id.to_string())
            .collect();
        assert_eq!(top, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn achievements_are_recorded_once() {
        let repo = InMemoryAchievementRepository::new();
        let user = uid("p1");
        repo.record(&user, &[AchievementId::FirstGame], Timestamp::now()).await.unwrap();
        repo.record(&user, &[AchievementId::FirstGame, AchievementId::FirstWin], Timestamp::now())
            .await
            .unwrap();

        assert_eq!(repo.unlocked_for(&user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn game_results_are_deduplicated_per_session() {
        let repo = InMemoryGameResultRepository::new();
        let result = GameResult {
            session_id: QuizSessionId::new(),
            user_id: uid("p1"),
            mode: QuizMode::Solo,
            rank: 1,
            player_count: 1,
            score: 300,
            correct_answers: 2,
            questions_answered: 2,
            total_time_ms: 4_000,
            xp_earned: 25,
            finished_at: Timestamp::now(),
        };
        let mut replay = result.clone();
        replay.xp_earned = 90;

        assert_eq!(repo.claim(&result).await.unwrap(), SaveResult::Inserted);
        assert_eq!(repo.claim(&replay).await.unwrap(), SaveResult::AlreadyExists);

        let history = repo.recent_for_user(&uid("p1"), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].xp_earned, 25);
    }

    #[tokio::test]
    async fn released_line_can_be_claimed_again() {
        let repo = InMemoryGameResultRepository::new();
        let session_id = QuizSessionId::new();
        let line = |user: &str| GameResult {
            session_id,
            user_id: uid(user),
            mode: QuizMode::Multiplayer,
            rank: 1,
            player_count: 2,
            score: 0,
            correct_answers: 0,
            questions_answered: 0,
            total_time_ms: 0,
            xp_earned: 10,
            finished_at: Timestamp::now(),
        };
        repo.claim(&line("p1")).await.unwrap();
        repo.claim(&line("p2")).await.unwrap();

        repo.release(&session_id, &uid("p1")).await.unwrap();

        let left: Vec<String> = repo
            .for_session(&session_id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id.to_string())
            .collect();
        assert_eq!(left, vec!["p2"]);
        assert_eq!(repo.claim(&line("p1")).await.unwrap(), SaveResult::Inserted);
    }
}
