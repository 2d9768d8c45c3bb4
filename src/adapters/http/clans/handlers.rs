use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::quiz::{SessionResponse, StartQuizRequest};
use crate::adapters::http::state::AppState;
use crate::adapters::http::stats::LeaderboardEntryResponse;
use crate::application::handlers::clans::{
    CreateClanCommand, JoinClanCommand, KickMemberCommand, SetMemberRoleCommand,
    StartClanQuizCommand,
};
use crate::domain::foundation::{ClanId, UserId};

use super::dto::{ClanResponse, CreateClanRequest, JoinClanRequest, LeaveClanResponse, SetRoleRequest};

/// POST /api/clans
pub async fn create_clan(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateClanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateClanCommand {
        owner_id: auth.0.id.clone(),
        owner_name: auth.display_name(),
        name: req.name,
        description: req.description,
    };
    let clan = state.create_clan_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(ClanResponse::from(&clan))))
}

/// GET /api/clans/mine
///
/// `null` when the caller is not in a clan.
pub async fn my_clan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let clan = state.my_clan_handler().handle(&user.id).await?;
    Ok(Json(clan.as_ref().map(ClanResponse::from)))
}

/// POST /api/clans/join
pub async fn join_clan(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<JoinClanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = JoinClanCommand {
        invite_code: req.invite_code,
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
    };
    let clan = state.join_clan_handler().handle(cmd).await?;
    Ok(Json(ClanResponse::from(&clan)))
}

/// GET /api/clans/:id
pub async fn get_clan(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(clan_id): Path<ClanId>,
) -> Result<impl IntoResponse, ApiError> {
    let clan = state.get_clan_handler().handle(&clan_id).await?;
    Ok(Json(ClanResponse::from(&clan)))
}

/// POST /api/clans/:id/leave
pub async fn leave_clan(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(clan_id): Path<ClanId>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.leave_clan_handler().handle(&clan_id, &user.id).await?;
    Ok(Json(LeaveClanResponse::from(outcome)))
}

/// POST /api/clans/:id/members/:user_id/role
pub async fn set_member_role(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((clan_id, target)): Path<(ClanId, String)>,
    Json(req): Json<SetRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = SetMemberRoleCommand {
        clan_id,
        by: user.id,
        target: UserId::new(target)?,
        role: req.role,
    };
    let clan = state.set_member_role_handler().handle(cmd).await?;
    Ok(Json(ClanResponse::from(&clan)))
}

/// DELETE /api/clans/:id/members/:user_id
pub async fn kick_member(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((clan_id, target)): Path<(ClanId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = KickMemberCommand {
        clan_id,
        by: user.id,
        target: UserId::new(target)?,
    };
    let clan = state.kick_member_handler().handle(cmd).await?;
    Ok(Json(ClanResponse::from(&clan)))
}

/// POST /api/clans/:id/sessions
pub async fn start_clan_quiz(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(clan_id): Path<ClanId>,
    body: Option<Json<StartQuizRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let cmd = StartClanQuizCommand {
        clan_id,
        user_id: user.id,
        topic: req.topic,
        question_ids: req.question_ids,
        count: req.count,
        time_limit_secs: req.time_limit_secs,
    };
    let session = state.start_clan_quiz_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(&session))))
}

/// GET /api/clans/:id/leaderboard
pub async fn clan_leaderboard(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(clan_id): Path<ClanId>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.clan_leaderboard_handler().handle(&clan_id).await?;
    let body: Vec<LeaderboardEntryResponse> = entries.iter().map(LeaderboardEntryResponse::from).collect();
    Ok(Json(body))
}
