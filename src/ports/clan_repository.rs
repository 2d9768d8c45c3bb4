//! Clan repository port.

use async_trait::async_trait;

use crate::domain::clan::{Clan, ClanMember};
use crate::domain::foundation::{ClanId, DomainError, ShareCode, UserId};

#[async_trait]
pub trait ClanRepository: Send + Sync {
    /// Persists a new clan with its owner membership.
    ///
    /// # Errors
    ///
    /// - `AlreadyInClan` if the owner already belongs to a clan
    async fn save(&self, clan: &Clan) -> Result<(), DomainError>;

    /// Persists owner and member role changes.
    async fn update(&self, clan: &Clan) -> Result<(), DomainError>;

    /// Deletes a clan; memberships cascade.
    async fn delete(&self, id: &ClanId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ClanId) -> Result<Option<Clan>, DomainError>;

    async fn find_by_invite_code(&self, code: &ShareCode) -> Result<Option<Clan>, DomainError>;

    /// The clan a user belongs to. Users belong to at most one clan.
    async fn find_by_member(&self, user_id: &UserId) -> Result<Option<Clan>, DomainError>;

    /// # Errors
    ///
    /// - `AlreadyInClan` if the user already belongs to a clan
    /// - `ClanFull` if the clan is at capacity
    async fn add_member(&self, clan_id: &ClanId, member: &ClanMember) -> Result<(), DomainError>;

    async fn remove_member(&self, clan_id: &ClanId, user_id: &UserId) -> Result<(), DomainError>;
}
