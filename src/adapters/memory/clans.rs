//! In-memory clan store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::clan::{Clan, ClanMember};
use crate::domain::foundation::{ClanId, DomainError, ErrorCode, ShareCode, Timestamp, UserId};
use crate::ports::ClanRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryClanRepository {
    clans: Arc<RwLock<HashMap<ClanId, Clan>>>,
}

impl InMemoryClanRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> DomainError {
    DomainError::new(ErrorCode::ClanNotFound, "Clan not found")
}

fn already_in_clan() -> DomainError {
    DomainError::new(ErrorCode::AlreadyInClan, "Already a member of a clan")
}

fn with_members(clan: &Clan, members: Vec<ClanMember>) -> Clan {
    Clan::reconstitute(
        *clan.id(),
        clan.name().to_string(),
        clan.description().map(str::to_string),
        clan.owner_id().clone(),
        clan.invite_code().clone(),
        clan.max_members(),
        members,
        *clan.created_at(),
        Timestamp::now(),
    )
}

#[async_trait]
impl ClanRepository for InMemoryClanRepository {
    async fn save(&self, clan: &Clan) -> Result<(), DomainError> {
        let mut clans = self.clans.write().await;
        let taken = clan
            .members()
            .iter()
            .any(|m| clans.values().any(|c| c.is_member(&m.user_id)));
        if taken {
            return Err(already_in_clan());
        }
        clans.insert(*clan.id(), clan.clone());
        Ok(())
    }

    async fn update(&self, clan: &Clan) -> Result<(), DomainError> {
        let mut clans = self.clans.write().await;
        let stored = clans.get(clan.id()).ok_or_else(not_found)?;
        let members: Vec<ClanMember> = stored
            .members()
            .iter()
            .cloned()
            .map(|mut m| {
                if let Some(role) = clan.role_of(&m.user_id) {
                    m.role = role;
                }
                m
            })
            .collect();
        let merged = with_members(clan, members);
        clans.insert(*clan.id(), merged);
        Ok(())
    }

    async fn delete(&self, id: &ClanId) -> Result<(), DomainError> {
        self.clans.write().await.remove(id);
        Ok(())
    }

    async fn find_by_id(&self, id: &ClanId) -> Result<Option<Clan>, DomainError> {
        Ok(self.clans.read().await.get(id).cloned())
    }

    async fn find_by_invite_code(&self, code: &ShareCode) -> Result<Option<Clan>, DomainError> {
        let clans = self.clans.read().await;
        Ok(clans.values().find(|c| c.invite_code() == code).cloned())
    }

    async fn find_by_member(&self, user_id: &UserId) -> Result<Option<Clan>, DomainError> {
        let clans = self.clans.read().await;
        Ok(clans.values().find(|c| c.is_member(user_id)).cloned())
    }

    async fn add_member(&self, clan_id: &ClanId, member: &ClanMember) -> Result<(), DomainError> {
        let mut clans = self.clans.write().await;
        if clans.values().any(|c| c.is_member(&member.user_id)) {
            return Err(already_in_clan());
        }
        let clan = clans.get(clan_id).ok_or_else(not_found)?;
        if clan.members().len() as u32 >= clan.max_members() {
            return Err(DomainError::new(ErrorCode::ClanFull, "Clan is full"));
        }
        let mut members = clan.members().to_vec();
        members.push(member.clone());
        let updated = with_members(clan, members);
        clans.insert(*clan_id, updated);
        Ok(())
    }

    async fn remove_member(&self, clan_id: &ClanId, user_id: &UserId) -> Result<(), DomainError> {
        let mut clans = self.clans.write().await;
        let clan = clans.get(clan_id).ok_or_else(not_found)?;
        let members: Vec<ClanMember> = clan
            .members()
            .iter()
            .filter(|m| &m.user_id != user_id)
            .cloned()
            .collect();
        let updated = with_members(clan, members);
        clans.insert(*clan_id, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clan::{ClanRole, DEFAULT_MAX_MEMBERS};

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn member(id: &str) -> ClanMember {
        ClanMember {
            user_id: uid(id),
            display_name: id.to_string(),
            role: ClanRole::Member,
            joined_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn a_user_belongs_to_one_clan() {
        let repo = InMemoryClanRepository::new();
        let first = Clan::create(uid("owner-a"), "A", "Alpha", None).unwrap();
        let second = Clan::create(uid("owner-b"), "B", "Bravo", None).unwrap();
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        repo.add_member(first.id(), &member("m1")).await.unwrap();
        let err = repo.add_member(second.id(), &member("m1")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyInClan);

        let found = repo.find_by_member(&uid("m1")).await.unwrap().unwrap();
        assert_eq!(found.id(), first.id());
    }

    #[tokio::test]
    async fn concurrent_joins_never_exceed_capacity() {
        let repo = InMemoryClanRepository::new();
        let clan = Clan::create(uid("owner"), "O", "Epsilon", None).unwrap();
        repo.save(&clan).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..DEFAULT_MAX_MEMBERS + 10 {
            let repo = repo.clone();
            let clan_id = *clan.id();
            handles.push(tokio::spawn(async move {
                repo.add_member(&clan_id, &member(&format!("m{}", i))).await
            }));
        }

        let mut joined = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => joined += 1,
                Err(err) => assert_eq!(err.code, ErrorCode::ClanFull),
            }
        }

        assert_eq!(joined, DEFAULT_MAX_MEMBERS - 1);
        let stored = repo.find_by_id(clan.id()).await.unwrap().unwrap();
        assert_eq!(stored.members().len() as u32, DEFAULT_MAX_MEMBERS);
    }

    #[tokio::test]
    async fn update_persists_role_changes() {
        let repo = InMemoryClanRepository::new();
        let mut clan = Clan::create(uid("owner"), "O", "Gamma", None).unwrap();
        repo.save(&clan).await.unwrap();
        repo.add_member(clan.id(), &member("m1")).await.unwrap();

        clan = repo.find_by_id(clan.id()).await.unwrap().unwrap();
        clan.set_role(&uid("owner"), &uid("m1"), ClanRole::Admin).unwrap();
        repo.update(&clan).await.unwrap();

        let stored = repo.find_by_invite_code(clan.invite_code()).await.unwrap().unwrap();
        assert_eq!(stored.role_of(&uid("m1")), Some(ClanRole::Admin));
    }

    #[tokio::test]
    async fn removed_members_can_join_elsewhere() {
        let repo = InMemoryClanRepository::new();
        let clan = Clan::create(uid("owner"), "O", "Delta", None).unwrap();
        repo.save(&clan).await.unwrap();
        repo.add_member(clan.id(), &member("m1")).await.unwrap();

        repo.remove_member(clan.id(), &uid("m1")).await.unwrap();
        assert!(repo.find_by_member(&uid("m1")).await.unwrap().is_none());

        repo.delete(clan.id()).await.unwrap();
        assert!(repo.find_by_id(clan.id()).await.unwrap().is_none());
    }
}
