use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::study::{GenerateNotesCommand, GenerateQuizCommand};

use super::dto::{GenerateNotesRequest, GenerateQuizRequest, GeneratedQuizResponse};

/// POST /api/study/notes
pub async fn generate_notes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<GenerateNotesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = GenerateNotesCommand {
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
        topic: req.topic,
        source_text: req.source_text,
        detail: req.detail,
    };
    let generated = state.generate_notes_handler().handle(cmd).await?;
    Ok(Json(generated))
}

/// POST /api/study/quiz
pub async fn generate_quiz(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = GenerateQuizCommand {
        user_id: auth.0.id.clone(),
        display_name: auth.display_name(),
        topic: req.topic,
        source_text: req.source_text,
        count: req.count,
        difficulty: req.difficulty,
    };
    let generated = state.generate_quiz_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(GeneratedQuizResponse::from(&generated))))
}

/// POST /api/study/extract
///
/// The raw document is the body; its `Content-Type` picks the extractor.
pub async fn extract_document(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let extracted = state.extract_document_handler().handle(content_type, &body)?;
    Ok(Json(extracted))
}
