//! Request and response bodies for `/api/clans`.

use serde::{Deserialize, Serialize};

use crate::domain::clan::{Clan, ClanLeaveOutcome, ClanMember, ClanRole};
use crate::domain::foundation::{ClanId, Timestamp, UserId};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClanRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinClanRequest {
    pub invite_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetRoleRequest {
    pub role: ClanRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClanResponse {
    pub id: ClanId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub invite_code: String,
    pub max_members: u32,
    pub member_count: usize,
    pub members: Vec<ClanMember>,
    pub created_at: Timestamp,
}

impl From<&Clan> for ClanResponse {
    fn from(clan: &Clan) -> Self {
        Self {
            id: *clan.id(),
            name: clan.name().to_string(),
            description: clan.description().map(str::to_string),
            owner_id: clan.owner_id().clone(),
            invite_code: clan.invite_code().to_string(),
            max_members: clan.max_members(),
            member_count: clan.members().len(),
            members: clan.members().to_vec(),
            created_at: *clan.created_at(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveClanResponse {
    /// True when the last member left and the clan was deleted.
    pub disbanded: bool,
}

impl From<ClanLeaveOutcome> for LeaveClanResponse {
    fn from(outcome: ClanLeaveOutcome) -> Self {
        Self {
            disbanded: outcome == ClanLeaveOutcome::Disbanded,
        }
    }
}
