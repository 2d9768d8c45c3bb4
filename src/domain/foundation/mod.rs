//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, authentication types and the error vocabulary
//! used across every Brain Battle module.

mod auth;
mod codes;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, IdentityProvider};
pub use codes::ShareCode;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ClanId, QuestionId, QuizSessionId, RoomId, UserId};
pub use timestamp::Timestamp;
