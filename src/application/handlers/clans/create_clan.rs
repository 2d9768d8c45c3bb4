//! CreateClanHandler - founds a clan with the caller as owner.

use std::sync::Arc;

use crate::application::handlers::progress::ProgressRecorder;
use crate::domain::clan::Clan;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::progression::AchievementContext;
use crate::ports::ClanRepository;

const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct CreateClanCommand {
    pub owner_id: UserId,
    pub owner_name: String,
    pub name: String,
    pub description: Option<String>,
}

pub struct CreateClanHandler {
    clans: Arc<dyn ClanRepository>,
    progress: Arc<ProgressRecorder>,
}

impl CreateClanHandler {
    pub fn new(clans: Arc<dyn ClanRepository>, progress: Arc<ProgressRecorder>) -> Self {
        Self { clans, progress }
    }

    pub async fn handle(&self, cmd: CreateClanCommand) -> Result<Clan, DomainError> {
        if self.clans.find_by_member(&cmd.owner_id).await?.is_some() {
            return Err(DomainError::new(ErrorCode::AlreadyInClan, "Leave your current clan first"));
        }

        for _ in 0..CODE_ATTEMPTS {
            let clan = Clan::create(
                cmd.owner_id.clone(),
                cmd.owner_name.clone(),
                &cmd.name,
                cmd.description.clone(),
            )?;
            match self.clans.save(&clan).await {
                Ok(()) => {
                    tracing::info!(clan_id = %clan.id(), owner = %cmd.owner_id, "Clan created");
                    self.progress
                        .record_milestone(
                            &cmd.owner_id,
                            &cmd.owner_name,
                            AchievementContext {
                                in_clan: true,
                                ..Default::default()
                            },
                        )
                        .await?;
                    return Ok(clan);
                }
                Err(e) if e.code == ErrorCode::Conflict => continue,
                Err(e) => return Err(e),
            }
        }
        Err(DomainError::internal("Could not allocate a unique invite code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAchievementRepository, InMemoryClanRepository, InMemoryPlayerStatsRepository};
    use crate::domain::clan::ClanRole;
    use crate::domain::progression::AchievementId;
    use crate::ports::AchievementRepository;

    fn handler() -> (CreateClanHandler, Arc<InMemoryAchievementRepository>) {
        let achievements = Arc::new(InMemoryAchievementRepository::new());
        let progress = Arc::new(ProgressRecorder::new(
            Arc::new(InMemoryPlayerStatsRepository::new()),
            achievements.clone(),
        ));
        (
            CreateClanHandler::new(Arc::new(InMemoryClanRepository::new()), progress),
            achievements,
        )
    }

    fn command(name: &str) -> CreateClanCommand {
        CreateClanCommand {
            owner_id: UserId::new("owner").unwrap(),
            owner_name: "Owner".to_string(),
            name: name.to_string(),
            description: Some("Weekly revision".to_string()),
        }
    }

    #[tokio::test]
    async fn owner_is_the_first_member_and_earns_clan_member() {
        let (handler, achievements) = handler();

        let clan = handler.handle(command("Study Hall")).await.unwrap();

        assert_eq!(clan.members().len(), 1);
        assert_eq!(clan.role_of(&UserId::new("owner").unwrap()), Some(ClanRole::Owner));
        assert_eq!(clan.invite_code().as_str().len(), 8);
        let unlocked = achievements.unlocked_for(&UserId::new("owner").unwrap()).await.unwrap();
        assert!(unlocked.iter().any(|u| u.id == AchievementId::ClanMember));
    }

    #[tokio::test]
    async fn one_clan_per_user() {
        let (handler, _) = handler();
        handler.handle(command("Study Hall")).await.unwrap();

        let err = handler.handle(command("Second Clan")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyInClan);
    }

    #[tokio::test]
    async fn short_names_are_rejected() {
        let (handler, _) = handler();
        let err = handler.handle(command("ab")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
