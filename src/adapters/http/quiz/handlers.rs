use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::quiz::{StartSoloQuizCommand, SubmitAnswerCommand};
use crate::domain::foundation::QuizSessionId;

use super::dto::{
    CompletedQuizResponse, QuizResultsResponse, SessionResponse, SessionWithQuestionsResponse,
    StartQuizRequest, SubmitAnswerRequest, SubmitAnswerResponse,
};

/// POST /api/quiz/sessions
pub async fn start_solo(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Option<Json<StartQuizRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let cmd = StartSoloQuizCommand {
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
        topic: req.topic,
        question_ids: req.question_ids,
        count: req.count,
        time_limit_secs: req.time_limit_secs,
    };
    let session = state.start_solo_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(&session))))
}

/// GET /api/quiz/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<QuizSessionId>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.get_session_handler().handle(&session_id, &user.id).await?;
    Ok(Json(SessionWithQuestionsResponse::from(&view)))
}

/// POST /api/quiz/sessions/:id/answers
pub async fn submit_answer(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(session_id): Path<QuizSessionId>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = SubmitAnswerCommand {
        session_id,
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
        question_index: req.question_index,
        selected_option: req.selected_option,
        time_taken_ms: req.time_taken_ms,
    };
    let answered = state.submit_answer_handler().handle(cmd).await?;
    Ok(Json(SubmitAnswerResponse::from(answered)))
}

/// POST /api/quiz/sessions/:id/complete
pub async fn complete_quiz(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<QuizSessionId>,
) -> Result<impl IntoResponse, ApiError> {
    let completed = state.complete_quiz_handler().handle(&session_id, &user.id).await?;
    Ok(Json(CompletedQuizResponse::from(&completed)))
}

/// GET /api/quiz/sessions/:id/results
pub async fn quiz_results(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<QuizSessionId>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.quiz_results_handler().handle(&session_id, &user.id).await?;
    Ok(Json(QuizResultsResponse::from(results)))
}
