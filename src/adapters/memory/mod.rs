//! In-memory repository adapters.
//!
//! Every repository port has an implementation here backed by
//! `tokio::sync::RwLock<HashMap<..>>`. They serve the integration tests and
//! local runs without a database; the server picks them when no database
//! URL is configured in development.

mod accounts;
mod clans;
mod progress;
mod questions;
mod quiz_sessions;
mod rooms;
mod webhook_events;

pub use accounts::InMemoryAccountRepository;
pub use clans::InMemoryClanRepository;
pub use progress::{InMemoryAchievementRepository, InMemoryGameResultRepository, InMemoryPlayerStatsRepository};
pub use questions::InMemoryQuestionRepository;
pub use quiz_sessions::InMemoryQuizSessionRepository;
pub use rooms::InMemoryRoomRepository;
pub use webhook_events::InMemoryWebhookEventRepository;
