use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::adapters::http::state::AppState;

use super::handlers::{extract_document, generate_notes, generate_quiz};

/// Uploaded documents may be larger than the default JSON limit.
const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Routes mounted at `/api/study`.
pub fn study_routes() -> Router<AppState> {
    Router::new()
        .route("/notes", post(generate_notes))
        .route("/quiz", post(generate_quiz))
        .route(
            "/extract",
            post(extract_document).layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
}
