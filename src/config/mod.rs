//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `BRAIN_BATTLE` prefix
//! and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use brain_battle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server listening on {}", config.server.bind_address());
//! ```

mod ai;
mod auth;
mod database;
mod error;
mod payment;
mod server;

pub use ai::AiConfig;
pub use auth::{AuthConfig, MIN_JWT_SECRET_BYTES};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::adapters::rate_limiter::RateLimitConfig;

/// Root application configuration.
///
/// Only `auth.jwt_secret` is mandatory everywhere; the remaining sections
/// have development defaults and are tightened by [`AppConfig::validate`]
/// in production.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `BRAIN_BATTLE` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `BRAIN_BATTLE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `BRAIN_BATTLE__RATE_LIMIT__PRO__AI_GENERATIONS_PER_DAY=500`
    ///   -> `rate_limit.pro.ai_generations_per_day = 500`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into their expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BRAIN_BATTLE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation, stricter in production (HTTPS authority, key
    /// prefixes, a long JWT secret, a real database and providers).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = self.server.environment;
        self.server.validate()?;
        self.database.validate(environment)?;
        self.auth.validate(environment)?;
        self.ai.validate(environment)?;
        self.payment.validate(environment)?;
        self.validate_rate_limits()
    }

    fn validate_rate_limits(&self) -> Result<(), ValidationError> {
        let limits = &self.rate_limit;
        let all = [
            limits.global.requests_per_minute,
            limits.per_ip.requests_per_minute,
            limits.user_requests_per_minute,
            limits.free.ai_generations_per_day,
            limits.pro.ai_generations_per_day,
        ];
        if all.contains(&0) {
            return Err(ValidationError::InvalidRateLimit);
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Whether to run on the in-memory stores instead of Postgres.
    pub fn uses_in_memory_storage(&self) -> bool {
        !self.database.is_configured() && self.server.environment == Environment::Development
    }
}
