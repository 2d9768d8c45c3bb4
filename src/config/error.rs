use thiserror::Error;

/// Environment variables could not be read into [`super::AppConfig`].
#[derive(Debug, Error)]
#[error("failed to load configuration: {0}")]
pub struct ConfigError(#[from] config::ConfigError);

/// A loaded value is unusable for the selected environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("BRAIN_BATTLE__{0} is required")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least {0} bytes in production")]
    JwtSecretTooShort(usize),

    #[error("Token lifetime must be between 60 seconds and 30 days")]
    InvalidTokenTtl,

    #[error("OIDC authority must use HTTPS in production")]
    AuthorityMustBeHttps,

    #[error("an OpenAI API key is required in production")]
    NoAiProviderConfigured,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("rate limits must be greater than zero")]
    InvalidRateLimit,
}
