//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token validation and the auth extractors
//! - `rate_limit` - global, per-IP and per-user request limits

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, AuthRejection, AuthState, OptionalAuth, RequireAuth};
pub use rate_limit::{rate_limit_middleware, RateLimitState};
