//! JoinClanHandler - joins a clan by invite code.

use std::sync::Arc;

use crate::application::handlers::progress::ProgressRecorder;
use crate::domain::clan::{Clan, ClanMember, ClanRole, INVITE_CODE_LEN};
use crate::domain::foundation::{DomainError, ErrorCode, ShareCode, Timestamp, UserId};
use crate::domain::progression::AchievementContext;
use crate::ports::ClanRepository;

use super::load_clan;

#[derive(Debug, Clone)]
pub struct JoinClanCommand {
    pub invite_code: String,
    pub user_id: UserId,
    pub display_name: String,
}

pub struct JoinClanHandler {
    clans: Arc<dyn ClanRepository>,
    progress: Arc<ProgressRecorder>,
}

impl JoinClanHandler {
    pub fn new(clans: Arc<dyn ClanRepository>, progress: Arc<ProgressRecorder>) -> Self {
        Self { clans, progress }
    }

    pub async fn handle(&self, cmd: JoinClanCommand) -> Result<Clan, DomainError> {
        let code = ShareCode::parse(&cmd.invite_code, INVITE_CODE_LEN)?;
        let mut clan = self
            .clans
            .find_by_invite_code(&code)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::ClanNotFound, "No clan with that invite code"))?;

        if clan.is_member(&cmd.user_id) {
            return Ok(clan);
        }
        if self.clans.find_by_member(&cmd.user_id).await?.is_some() {
            return Err(DomainError::new(ErrorCode::AlreadyInClan, "Leave your current clan first"));
        }

        clan.join(cmd.user_id.clone(), cmd.display_name.clone())?;
        let member = ClanMember {
            user_id: cmd.user_id.clone(),
            display_name: cmd.display_name.clone(),
            role: ClanRole::Member,
            joined_at: Timestamp::now(),
        };
        self.clans.add_member(clan.id(), &member).await?;
        tracing::info!(clan_id = %clan.id(), user_id = %cmd.user_id, "Member joined clan");

        self.progress
            .record_milestone(
                &cmd.user_id,
                &cmd.display_name,
                AchievementContext {
                    in_clan: true,
                    ..Default::default()
                },
            )
            .await?;

        load_clan(self.clans.as_ref(), clan.id()).await
    }
}
