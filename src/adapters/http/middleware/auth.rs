//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - validates Bearer tokens and injects the user into extensions
//! - `RequireAuth` - extractor that rejects anonymous requests with 401
//! - `OptionalAuth` - extractor for routes that also serve anonymous callers
//!
//! The middleware only sees the `SessionValidator` port, so local HS256
//! tokens and third-party OIDC tokens travel the same path.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

pub type AuthState = Arc<dyn SessionValidator>;

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates a Bearer token when one is sent.
///
/// Requests without a token pass through anonymously; `RequireAuth` decides
/// whether the route needs a user. A token that fails validation is
/// rejected here with 401 (or 503 if the identity provider is down).
pub async fn auth_middleware(State(validator): State<AuthState>, mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!(error = %msg, "Identity provider unavailable");
                    (StatusCode::SERVICE_UNAVAILABLE, "Authentication service unavailable")
                }
                _ => (StatusCode::UNAUTHORIZED, "Invalid token"),
            };
            (status, Json(ErrorResponse::new("UNAUTHORIZED", message))).into_response()
        }
    }
}

/// Extractor that requires an authenticated user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl RequireAuth {
    /// Name shown to other players.
    pub fn display_name(&self) -> String {
        self.0.display_name_or_email().to_string()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional authentication.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("UNAUTHORIZED", "Authentication required")),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::domain::foundation::UserId;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn test_user() -> AuthenticatedUser {
        AuthenticatedUser::new(
            UserId::new("user-123").unwrap(),
            "test@example.com",
            Some("Test User".to_string()),
            true,
        )
    }

    fn app() -> Router {
        let validator: AuthState = Arc::new(MockSessionValidator::new().with_user("valid-token", test_user()));
        Router::new()
            .route("/me", get(|RequireAuth(user): RequireAuth| async move { user.email }))
            .route(
                "/maybe",
                get(|OptionalAuth(user): OptionalAuth| async move {
                    user.map(|u| u.email).unwrap_or_else(|| "guest".to_string())
                }),
            )
            .layer(middleware::from_fn_with_state(validator, auth_middleware))
    }

    async fn get_with(uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_reaches_protected_route() {
        let response = get_with("/me", Some("valid-token")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "test@example.com");
    }

    #[tokio::test]
    async fn missing_token_is_rejected_by_require_auth() {
        let response = get_with("/me", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_even_on_optional_routes() {
        let response = get_with("/maybe", Some("forged")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn anonymous_callers_pass_optional_auth() {
        let response = get_with("/maybe", None).await;
        assert_eq!(body_text(response).await, "guest");
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }
}
