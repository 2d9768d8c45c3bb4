//! ProgressRecorder - applies XP and achievement unlocks to a player.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::progression::{unlock_new, Achievement, AchievementContext, AchievementId, GameOutcome, PlayerStats};
use crate::ports::{AchievementRepository, PlayerStatsRepository};

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stats: PlayerStats,
    /// Game XP plus achievement rewards.
    pub xp_earned: u64,
    pub unlocked: Vec<&'static Achievement>,
}

impl ProgressUpdate {
    pub fn unlocked_ids(&self) -> Vec<AchievementId> {
        self.unlocked.iter().map(|a| a.id).collect()
    }
}

/// Shared by every handler that can move a player's totals.
pub struct ProgressRecorder {
    stats: Arc<dyn PlayerStatsRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl ProgressRecorder {
    pub fn new(stats: Arc<dyn PlayerStatsRepository>, achievements: Arc<dyn AchievementRepository>) -> Self {
        Self { stats, achievements }
    }

    /// Stored stats, or a zeroed record that has not been saved yet.
    pub async fn load(&self, user_id: &UserId, display_name: &str) -> Result<PlayerStats, DomainError> {
        Ok(self
            .stats
            .find(user_id)
            .await?
            .unwrap_or_else(|| PlayerStats::new(user_id.clone(), display_name)))
    }

    /// Works out what one finished game does to a player without writing
    /// anything; [`apply`](Self::apply) persists the result.
    pub async fn preview_game(
        &self,
        user_id: &UserId,
        display_name: &str,
        outcome: &GameOutcome,
        in_clan: bool,
    ) -> Result<ProgressUpdate, DomainError> {
        let mut stats = self.load(user_id, display_name).await?;
        let before = stats.total_xp;
        stats.record_game(outcome, Timestamp::now().date());

        let ctx = AchievementContext {
            last_game: Some(outcome),
            in_clan,
            generated_study_set: false,
        };
        self.evaluate(stats, display_name, before, &ctx).await
    }

    /// Checks unlocks triggered outside a game (joining a clan, generating a study set).
    pub async fn record_milestone(
        &self,
        user_id: &UserId,
        display_name: &str,
        ctx: AchievementContext<'_>,
    ) -> Result<ProgressUpdate, DomainError> {
        let stats = self.load(user_id, display_name).await?;
        let before = stats.total_xp;
        let update = self.evaluate(stats, display_name, before, &ctx).await?;
        self.apply(&update).await?;
        Ok(update)
    }

    pub async fn apply(&self, update: &ProgressUpdate) -> Result<(), DomainError> {
        self.stats.upsert(&update.stats).await?;

        if !update.unlocked.is_empty() {
            let ids = update.unlocked_ids();
            self.achievements
                .record(&update.stats.user_id, &ids, Timestamp::now())
                .await?;
            tracing::info!(user_id = %update.stats.user_id, achievements = ?ids, "Achievements unlocked");
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        mut stats: PlayerStats,
        display_name: &str,
        xp_before: u64,
        ctx: &AchievementContext<'_>,
    ) -> Result<ProgressUpdate, DomainError> {
        let already: HashSet<AchievementId> = self
            .achievements
            .unlocked_for(&stats.user_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();
        let unlocked = unlock_new(&mut stats, ctx, &already);
        stats.display_name = display_name.to_string();

        Ok(ProgressUpdate {
            xp_earned: stats.total_xp.saturating_sub(xp_before),
            stats,
            unlocked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAchievementRepository, InMemoryPlayerStatsRepository};

    fn recorder() -> (ProgressRecorder, Arc<InMemoryPlayerStatsRepository>, Arc<InMemoryAchievementRepository>) {
        let stats = Arc::new(InMemoryPlayerStatsRepository::new());
        let achievements = Arc::new(InMemoryAchievementRepository::new());
        (ProgressRecorder::new(stats.clone(), achievements.clone()), stats, achievements)
    }

    fn solo_game(correct: u32) -> GameOutcome {
        GameOutcome {
            score: correct * 150,
            correct_answers: correct,
            questions_answered: 5,
            total_questions: 5,
            total_time_ms: 5 * 8_000,
            placement: None,
        }
    }

    async fn play(recorder: &ProgressRecorder, user: &UserId, outcome: &GameOutcome) -> ProgressUpdate {
        let update = recorder.preview_game(user, "Ada", outcome, false).await.unwrap();
        recorder.apply(&update).await.unwrap();
        update
    }

    #[tokio::test]
    async fn first_game_unlocks_first_game_once() {
        let (recorder, stats_repo, achievements) = recorder();
        let user = UserId::new("u1").unwrap();

        let first = play(&recorder, &user, &solo_game(2)).await;
        let second = play(&recorder, &user, &solo_game(2)).await;

        assert!(first.unlocked_ids().contains(&AchievementId::FirstGame));
        assert!(!second.unlocked_ids().contains(&AchievementId::FirstGame));
        assert!(first.xp_earned > 0);
        let stored = stats_repo.find(&user).await.unwrap().unwrap();
        assert_eq!(stored.games_played, 2);
        assert_eq!(stored.total_xp, first.xp_earned + second.xp_earned);
        let unlocked = achievements.unlocked_for(&user).await.unwrap();
        assert_eq!(
            unlocked.iter().filter(|u| u.id == AchievementId::FirstGame).count(),
            1
        );
    }

    #[tokio::test]
    async fn milestone_awards_without_counting_a_game() {
        let (recorder, _, _) = recorder();
        let user = UserId::new("u1").unwrap();

        let update = recorder
            .record_milestone(
                &user,
                "Ada",
                AchievementContext {
                    generated_study_set: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(update.unlocked_ids(), vec![AchievementId::Scholar]);
        assert_eq!(update.stats.games_played, 0);
        assert_eq!(update.xp_earned, update.unlocked[0].xp_reward);
    }

    #[tokio::test]
    async fn preview_leaves_the_stored_record_alone() {
        let (recorder, stats_repo, achievements) = recorder();
        let user = UserId::new("u1").unwrap();

        let update = recorder.preview_game(&user, "Ada", &solo_game(3), false).await.unwrap();

        assert_eq!(update.stats.games_played, 1);
        assert!(stats_repo.find(&user).await.unwrap().is_none());
        assert!(achievements.unlocked_for(&user).await.unwrap().is_empty());
    }
}
