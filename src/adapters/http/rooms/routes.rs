use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{create_room, get_room, join_room, leave_room, list_rooms, set_ready, start_game};

/// Routes mounted at `/api/rooms`.
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_room).get(list_rooms))
        .route("/join", post(join_room))
        .route("/:id", get(get_room))
        .route("/:id/leave", post(leave_room))
        .route("/:id/ready", post(set_ready))
        .route("/:id/start", post(start_game))
}
