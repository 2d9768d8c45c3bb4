//! Achievement unlock storage.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::progression::{AchievementId, UnlockedAchievement};

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    async fn unlocked_for(&self, user_id: &UserId) -> Result<Vec<UnlockedAchievement>, DomainError>;

    /// Records unlocks. Already-recorded pairs are left as they are.
    async fn record(
        &self,
        user_id: &UserId,
        ids: &[AchievementId],
        unlocked_at: Timestamp,
    ) -> Result<(), DomainError>;
}
