//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - OpenAI chat completions and a scripted mock
//! - `auth` - HS256 tokens, OIDC validation, argon2 password hashing
//! - `http` - the axum REST API
//! - `memory` - in-memory repositories for tests and local runs
//! - `postgres` - sqlx repositories
//! - `rate_limiter` - fixed-window request quotas
//! - `stripe` - hosted checkout

pub mod ai;
pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod stripe;
