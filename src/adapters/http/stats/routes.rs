use axum::{routing::get, Router};

use crate::adapters::http::state::AppState;

use super::handlers::{achievements, leaderboard, my_stats, player_stats};

/// Routes merged at `/api`.
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/me", get(my_stats))
        .route("/stats/:user_id", get(player_stats))
        .route("/leaderboard", get(leaderboard))
        .route("/achievements", get(achievements))
}
