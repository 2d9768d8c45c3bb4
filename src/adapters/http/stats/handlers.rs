use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::domain::foundation::UserId;

use super::dto::{AchievementResponse, LeaderboardEntryResponse, LeaderboardQuery, ProfileResponse};

/// GET /api/stats/me
///
/// Creates an empty stats row on first visit.
pub async fn my_stats(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.profile_handler().mine(&auth.0.id, &auth.display_name()).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// GET /api/stats/:user_id
pub async fn player_stats(
    State(state): State<AppState>,
    RequireAuth(_viewer): RequireAuth,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::new(user_id)?;
    let profile = state.profile_handler().public(&user_id).await?;
    Ok(Json(ProfileResponse::from(&profile)))
}

/// GET /api/leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.leaderboard_handler().handle(query.limit).await?;
    let body: Vec<LeaderboardEntryResponse> = entries.iter().map(LeaderboardEntryResponse::from).collect();
    Ok(Json(body))
}

/// GET /api/achievements
pub async fn achievements(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.achievements_handler().handle(&user.id).await?;
    let body: Vec<AchievementResponse> = views.iter().map(AchievementResponse::from).collect();
    Ok(Json(body))
}
