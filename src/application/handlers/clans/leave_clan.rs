//! LeaveClanHandler - leaves a clan, disbanding it when the owner is alone.

use std::sync::Arc;

use crate::domain::clan::ClanLeaveOutcome;
use crate::domain::foundation::{ClanId, DomainError, UserId};
use crate::ports::ClanRepository;

use super::load_clan;

pub struct LeaveClanHandler {
    clans: Arc<dyn ClanRepository>,
}

impl LeaveClanHandler {
    pub fn new(clans: Arc<dyn ClanRepository>) -> Self {
        Self { clans }
    }

    pub async fn handle(&self, clan_id: &ClanId, user_id: &UserId) -> Result<ClanLeaveOutcome, DomainError> {
        let mut clan = load_clan(self.clans.as_ref(), clan_id).await?;
        let outcome = clan.leave(user_id)?;
        match outcome {
            ClanLeaveOutcome::Left => self.clans.remove_member(clan_id, user_id).await?,
            ClanLeaveOutcome::Disbanded => {
                self.clans.delete(clan_id).await?;
                tracing::info!(clan_id = %clan_id, "Clan disbanded");
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryClanRepository;
    use crate::domain::clan::{Clan, ClanMember, ClanRole};
    use crate::domain::foundation::{ErrorCode, Timestamp};

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    async fn clan_with_member(repo: &InMemoryClanRepository) -> Clan {
        let clan = Clan::create(uid("owner"), "Owner", "Study Hall", None).unwrap();
        repo.save(&clan).await.unwrap();
        repo.add_member(
            clan.id(),
            &ClanMember {
                user_id: uid("m1"),
                display_name: "M1".to_string(),
                role: ClanRole::Member,
                joined_at: Timestamp::now(),
            },
        )
        .await
        .unwrap();
        clan
    }

    #[tokio::test]
    async fn owner_must_hand_over_before_leaving() {
        let repo = Arc::new(InMemoryClanRepository::new());
        let clan = clan_with_member(&repo).await;
        let handler = LeaveClanHandler::new(repo.clone());

        let err = handler.handle(clan.id(), &uid("owner")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn sole_owner_leaving_disbands_the_clan() {
        let repo = Arc::new(InMemoryClanRepository::new());
        let clan = clan_with_member(&repo).await;
        let handler = LeaveClanHandler::new(repo.clone());

        assert_eq!(handler.handle(clan.id(), &uid("m1")).await.unwrap(), ClanLeaveOutcome::Left);
        assert_eq!(
            handler.handle(clan.id(), &uid("owner")).await.unwrap(),
            ClanLeaveOutcome::Disbanded
        );
        assert!(repo.find_by_id(clan.id()).await.unwrap().is_none());
    }
}
