//! Request rate limiting for axum.
//!
//! Scopes are checked in order: global, then the client IP, then the
//! authenticated user. The first denial wins and is answered with 429.
//!
//! Status is reported in headers:
//! - `X-RateLimit-Limit`
//! - `X-RateLimit-Remaining`
//! - `X-RateLimit-Reset` (unix seconds)
//! - `Retry-After` (429 only)
//!
//! A failing limiter backend lets the request through.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::adapters::rate_limiter::RateLimitConfig;
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{RateLimitDenied, RateLimitKey, RateLimitResult, RateLimitStatus, RateLimiter};

pub mod headers {
    use super::HeaderName;

    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<dyn RateLimiter>,
    pub config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(limiter: Arc<dyn RateLimiter>, config: RateLimitConfig) -> Self {
        Self { limiter, config }
    }

    /// Consumes one request from `key`. `Ok(None)` means the backend failed.
    async fn consume(&self, key: &RateLimitKey) -> Result<Option<RateLimitStatus>, RateLimitDenied> {
        let quota = self.config.quota_for_scope(key.scope);
        match self.limiter.check(key, quota).await {
            Ok(RateLimitResult::Allowed(status)) => Ok(Some(status)),
            Ok(RateLimitResult::Denied(denied)) => Err(denied),
            Err(e) => {
                tracing::warn!(scope = %key.scope, error = %e, "Rate limiter unavailable");
                Ok(None)
            }
        }
    }
}

/// Checks global, IP and user limits before running the handler.
///
/// Must run after `auth_middleware` so the user scope sees the caller.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.enabled {
        return next.run(request).await;
    }

    let client_ip = extract_client_ip(request.headers(), connect_info.as_ref());
    let user_id = request.extensions().get::<AuthenticatedUser>().map(|u| u.id.clone());

    let mut keys = vec![RateLimitKey::global()];
    if let Some(ip) = &client_ip {
        keys.push(RateLimitKey::ip(ip));
    }
    if let Some(user_id) = &user_id {
        keys.push(RateLimitKey::user(user_id));
    }

    // Headers report the most specific scope that answered.
    let mut reported = None;
    for key in &keys {
        match state.consume(key).await {
            Ok(Some(status)) => reported = Some(status),
            Ok(None) => {}
            Err(denied) => {
                tracing::info!(
                    scope = %denied.scope,
                    retry_after_secs = denied.retry_after_secs,
                    "Request rate limited"
                );
                return rate_limit_response(&denied);
            }
        }
    }

    let mut response = next.run(request).await;
    if let Some(status) = reported {
        add_rate_limit_headers(
            response.headers_mut(),
            status.limit,
            status.remaining,
            status.reset_at.as_unix_secs(),
        );
    }
    response
}

/// Client IP, preferring proxy headers over the socket address.
fn extract_client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = real_ip {
        return Some(ip.to_string());
    }

    connect_info.map(|ci| ci.0.ip().to_string())
}

fn rate_limit_response(denied: &RateLimitDenied) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new("RATE_LIMITED", denied.message.clone())),
    )
        .into_response();

    let headers = response.headers_mut();
    add_rate_limit_headers(headers, denied.limit, 0, denied.reset_at.as_unix_secs());
    headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(denied.retry_after_secs));
    response
}

fn add_rate_limit_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_at: u64) {
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(headers::X_RATELIMIT_REMAINING.clone(), HeaderValue::from(remaining));
    headers.insert(headers::X_RATELIMIT_RESET.clone(), HeaderValue::from(reset_at));
}
