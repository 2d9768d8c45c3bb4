//! PostgreSQL adapters - sqlx implementations of the repository ports.
//!
//! Queries are checked at runtime (`sqlx::query`), so the crate builds
//! without a live database. The schema lives in `migrations/` at the crate
//! root and is embedded with `sqlx::migrate!`.

mod accounts;
mod clans;
mod progress;
mod questions;
mod quiz_sessions;
mod rooms;
mod webhook_events;

pub use accounts::PostgresAccountRepository;
pub use clans::PostgresClanRepository;
pub use progress::{
    PostgresAchievementRepository, PostgresGameResultRepository, PostgresPlayerStatsRepository,
};
pub use questions::PostgresQuestionRepository;
pub use quiz_sessions::PostgresQuizSessionRepository;
pub use rooms::PostgresRoomRepository;
pub use webhook_events::PostgresWebhookEventRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Opens a connection pool sized and timed from configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn db_error(context: &str) -> impl Fn(sqlx::Error) -> DomainError + '_ {
    move |e| {
        tracing::error!(error = %e, context, "Database query failed");
        DomainError::database(context, e)
    }
}

/// Whether `err` violated the named unique or check constraint.
fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(constraint))
}

fn corrupt(what: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", what, value),
    )
}

fn user_id(raw: String) -> Result<UserId, DomainError> {
    UserId::new(raw).map_err(|e| corrupt("user id", e))
}

fn label<T>(what: &str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, DomainError> {
    parse(raw).ok_or_else(|| corrupt(what, raw))
}
