//! Assembles the full API router.
//!
//! Middleware order, outermost first: request id, trace, CORS, compression,
//! timeout, then per-request auth and rate limiting on `/api`.

use axum::{middleware, routing::get, Json, Router};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::auth::auth_routes;
use super::billing::{billing_routes, webhook_routes};
use super::clans::clan_routes;
use super::middleware::{auth_middleware, rate_limit_middleware, RateLimitState};
use super::quiz::quiz_routes;
use super::rooms::room_routes;
use super::state::AppState;
use super::stats::stats_routes;
use super::study::study_routes;

/// Builds the application router.
///
/// # Routes
///
/// - `GET /health`
/// - `/api/auth` - register, login, sync, me
/// - `/api/rooms` - lobbies
/// - `/api/clans` - clans, members, clan sessions, clan leaderboard
/// - `/api/quiz` - quiz sessions
/// - `/api/stats`, `/api/leaderboard`, `/api/achievements`
/// - `/api/study` - AI notes, AI quizzes, document extraction
/// - `/api/billing`, `/api/webhooks`
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let rate_limit = RateLimitState::new(state.rate_limiter.clone(), state.rate_limits.clone());
    let validator = state.session_validator.clone();

    // Layers wrap in reverse: auth runs before rate limiting so the user scope applies.
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/rooms", room_routes())
        .nest("/clans", clan_routes())
        .nest("/quiz", quiz_routes())
        .nest("/study", study_routes())
        .nest("/billing", billing_routes())
        .nest("/webhooks", webhook_routes())
        .merge(stats_routes())
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(middleware::from_fn_with_state(validator, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Any origin when none are configured or `*` is listed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_accepts_wildcard_and_lists() {
        let _any = build_cors_layer(&[]);
        let _wildcard = build_cors_layer(&["*".to_string()]);
        let _listed = build_cors_layer(&[
            "http://localhost:5173".to_string(),
            "https://brainbattle.app".to_string(),
        ]);
    }
}
