use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::auth::{LoginCommand, RegisterCommand};

use super::dto::{AccountResponse, AuthResponse, LoginRequest, RegisterRequest, SyncResponse};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = RegisterCommand {
        email: req.email,
        password: req.password,
        display_name: req.display_name,
    };
    let signed_in = state.register_handler().handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(signed_in))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = LoginCommand {
        email: req.email,
        password: req.password,
    };
    let signed_in = state.login_handler().handle(cmd).await?;
    Ok(Json(AuthResponse::from(signed_in)))
}

/// POST /api/auth/sync
///
/// Creates the local record for a third-party identity on first sign-in.
pub async fn sync_account(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.sync_account_handler().handle(&user).await?;
    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(SyncResponse::from(result))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.get_account_handler().handle(&user.id).await?;
    Ok(Json(AccountResponse::from(&account)))
}
