//! Player statistics repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::progression::PlayerStats;

#[async_trait]
pub trait PlayerStatsRepository: Send + Sync {
    async fn find(&self, user_id: &UserId) -> Result<Option<PlayerStats>, DomainError>;

    /// Inserts or replaces a player's row.
    ///
    /// Implementations never lower a stored `total_xp`.
    async fn upsert(&self, stats: &PlayerStats) -> Result<(), DomainError>;

    /// Highest XP first; ties broken by user id.
    async fn top_by_xp(&self, limit: u32) -> Result<Vec<PlayerStats>, DomainError>;

    /// Stats rows for the given users, in no particular order.
    async fn find_by_users(&self, user_ids: &[UserId]) -> Result<Vec<PlayerStats>, DomainError>;
}
