//! Role changes and removals inside a clan.

use std::sync::Arc;

use crate::domain::clan::{Clan, ClanRole};
use crate::domain::foundation::{ClanId, DomainError, UserId};
use crate::ports::ClanRepository;

use super::load_clan;

#[derive(Debug, Clone)]
pub struct SetMemberRoleCommand {
    pub clan_id: ClanId,
    pub by: UserId,
    pub target: UserId,
    /// `Owner` transfers ownership; the previous owner becomes an admin.
    pub role: ClanRole,
}

pub struct SetMemberRoleHandler {
    clans: Arc<dyn ClanRepository>,
}

impl SetMemberRoleHandler {
    pub fn new(clans: Arc<dyn ClanRepository>) -> Self {
        Self { clans }
    }

    pub async fn handle(&self, cmd: SetMemberRoleCommand) -> Result<Clan, DomainError> {
        let mut clan = load_clan(self.clans.as_ref(), &cmd.clan_id).await?;
        clan.set_role(&cmd.by, &cmd.target, cmd.role)?;
        self.clans.update(&clan).await?;
        tracing::info!(clan_id = %cmd.clan_id, target = %cmd.target, role = %cmd.role, "Clan role changed");
        Ok(clan)
    }
}

#[derive(Debug, Clone)]
pub struct KickMemberCommand {
    pub clan_id: ClanId,
    pub by: UserId,
    pub target: UserId,
}

pub struct KickMemberHandler {
    clans: Arc<dyn ClanRepository>,
}

impl KickMemberHandler {
    pub fn new(clans: Arc<dyn ClanRepository>) -> Self {
        Self { clans }
    }

    pub async fn handle(&self, cmd: KickMemberCommand) -> Result<Clan, DomainError> {
        let mut clan = load_clan(self.clans.as_ref(), &cmd.clan_id).await?;
        clan.kick(&cmd.by, &cmd.target)?;
        self.clans.remove_member(&cmd.clan_id, &cmd.target).await?;
        tracing::info!(clan_id = %cmd.clan_id, target = %cmd.target, by = %cmd.by, "Member removed from clan");
        Ok(clan)
    }
}
