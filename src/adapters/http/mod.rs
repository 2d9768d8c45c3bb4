//! HTTP adapter - the axum REST API.
//!
//! One folder per feature (`dto`, `handlers`, `routes`), sharing `AppState`,
//! the auth and rate-limit middleware, and the `ApiError` mapping.

pub mod auth;
pub mod billing;
pub mod clans;
pub mod error;
pub mod middleware;
pub mod quiz;
pub mod rooms;
pub mod router;
pub mod state;
pub mod stats;
pub mod study;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use router::build_router;
pub use state::AppState;
