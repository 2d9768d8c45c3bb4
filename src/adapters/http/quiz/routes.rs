use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::state::AppState;

use super::handlers::{complete_quiz, get_session, quiz_results, start_solo, submit_answer};

/// Routes mounted at `/api/quiz`.
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_solo))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/answers", post(submit_answer))
        .route("/sessions/:id/complete", post(complete_quiz))
        .route("/sessions/:id/results", get(quiz_results))
}
