use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{
    clan_leaderboard, create_clan, get_clan, join_clan, kick_member, leave_clan, my_clan,
    set_member_role, start_clan_quiz,
};

/// Routes mounted at `/api/clans`.
pub fn clan_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_clan))
        .route("/mine", get(my_clan))
        .route("/join", post(join_clan))
        .route("/:id", get(get_clan))
        .route("/:id/leave", post(leave_clan))
        .route("/:id/members/:user_id", delete(kick_member))
        .route("/:id/members/:user_id/role", post(set_member_role))
        .route("/:id/sessions", post(start_clan_quiz))
        .route("/:id/leaderboard", get(clan_leaderboard))
}
