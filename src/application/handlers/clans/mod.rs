//! Clan handlers - membership, roles, clan quizzes and the clan leaderboard.

mod clan_queries;
mod create_clan;
mod join_clan;
mod leave_clan;
mod manage_members;
mod start_clan_quiz;

pub use clan_queries::{ClanLeaderboardHandler, GetClanHandler, GetMyClanHandler};
pub use create_clan::{CreateClanCommand, CreateClanHandler};
pub use join_clan::{JoinClanCommand, JoinClanHandler};
pub use leave_clan::LeaveClanHandler;
pub use manage_members::{KickMemberCommand, KickMemberHandler, SetMemberRoleCommand, SetMemberRoleHandler};
pub use start_clan_quiz::{StartClanQuizCommand, StartClanQuizHandler};

use crate::domain::clan::Clan;
use crate::domain::foundation::{ClanId, DomainError, ErrorCode};
use crate::ports::ClanRepository;

pub(crate) async fn load_clan(clans: &dyn ClanRepository, id: &ClanId) -> Result<Clan, DomainError> {
    clans
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::new(ErrorCode::ClanNotFound, "Clan not found"))
}
