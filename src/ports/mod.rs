//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `AccountRepository` - User accounts and billing identifiers
//! - `RoomRepository` - Lobbies, including the capacity-guarded join
//! - `ClanRepository` - Clans and their members
//! - `QuizSessionRepository` - Quiz sessions, participants and answers
//! - `QuestionRepository` - Question bank and served-question history
//! - `PlayerStatsRepository` - Lifetime stats and the XP leaderboard
//! - `AchievementRepository` - Unlocked achievements
//! - `GameResultRepository` - Per-player outcome of finished games
//! - `WebhookEventRepository` - Stripe webhook idempotency tracking
//!
//! ## Identity Ports
//!
//! - `SessionValidator` - Bearer token validation
//! - `PasswordHasher` - Password hashing for local accounts
//! - `TokenIssuer` - Access tokens for local sign-in
//!
//! ## External Service Ports
//!
//! - `AIProvider` - LLM completions for study material
//! - `PaymentProvider` - Hosted checkout
//! - `RateLimiter` - Request quotas

mod account_repository;
mod achievement_repository;
mod ai_provider;
mod clan_repository;
mod game_result_repository;
mod password_hasher;
mod payment_provider;
mod player_stats_repository;
mod question_repository;
mod quiz_session_repository;
mod rate_limiter;
mod room_repository;
mod session_validator;
mod token_issuer;
mod webhook_event_repository;

pub use account_repository::{AccountRepository, SubscriptionUpdate};
pub use achievement_repository::AchievementRepository;
pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use clan_repository::ClanRepository;
pub use game_result_repository::{GameResult, GameResultRepository};
pub use password_hasher::PasswordHasher;
pub use payment_provider::{CheckoutRequest, CheckoutSession, PaymentProvider};
pub use player_stats_repository::PlayerStatsRepository;
pub use question_repository::QuestionRepository;
pub use quiz_session_repository::QuizSessionRepository;
pub use rate_limiter::{
    Quota, RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitScope,
    RateLimitStatus, RateLimiter,
};
pub use room_repository::RoomRepository;
pub use session_validator::SessionValidator;
pub use token_issuer::{IssuedToken, TokenIssuer};
pub use webhook_event_repository::{SaveResult, WebhookEventRecord, WebhookEventRepository};
