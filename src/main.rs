//! Brain Battle API server.
//!
//! Configuration comes from `BRAIN_BATTLE__*` environment variables (and
//! `.env` in development). With no database URL in development the server
//! runs on in-memory stores; without OpenAI or Stripe keys it falls back to
//! the mock providers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brain_battle::adapters::ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
use brain_battle::adapters::auth::{
    Argon2PasswordHasher, CompositeSessionValidator, LocalJwtService, OidcConfig,
    OidcSessionValidator,
};
use brain_battle::adapters::http::{build_router, AppState};
use brain_battle::adapters::memory::{
    InMemoryAccountRepository, InMemoryAchievementRepository, InMemoryClanRepository,
    InMemoryGameResultRepository, InMemoryPlayerStatsRepository, InMemoryQuestionRepository,
    InMemoryQuizSessionRepository, InMemoryRoomRepository, InMemoryWebhookEventRepository,
};
use brain_battle::adapters::postgres::{
    self, PostgresAccountRepository, PostgresAchievementRepository, PostgresClanRepository,
    PostgresGameResultRepository, PostgresPlayerStatsRepository, PostgresQuestionRepository,
    PostgresQuizSessionRepository, PostgresRoomRepository, PostgresWebhookEventRepository,
};
use brain_battle::adapters::rate_limiter::InMemoryRateLimiter;
use brain_battle::adapters::stripe::{MockPaymentProvider, StripeConfig, StripePaymentProvider};
use brain_battle::config::AppConfig;
use brain_battle::ports::{AIProvider, PaymentProvider, SessionValidator};

/// How often expired rate-limit windows are dropped.
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        bind_address = %config.server.bind_address(),
        "Starting Brain Battle"
    );

    let stores = if config.uses_in_memory_storage() {
        tracing::warn!("No database configured - using in-memory stores");
        Stores::in_memory()
    } else {
        let pool = postgres::connect(&config.database).await?;
        if config.database.run_migrations {
            postgres::run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");
        }
        Stores::postgres(pool)
    };

    let jwt = Arc::new(LocalJwtService::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.clone(),
        config.auth.token_ttl_secs,
    ));
    let mut validators: Vec<Arc<dyn SessionValidator>> = vec![jwt.clone()];
    if let Some((authority, audience)) = config.auth.oidc() {
        let mut oidc = OidcConfig::new(authority, audience).with_jwks_ttl(config.auth.jwks_cache_ttl());
        if let Some(url) = &config.auth.oidc_jwks_url {
            oidc = oidc.with_jwks_url(url.clone());
        }
        validators.push(Arc::new(OidcSessionValidator::new(oidc)));
        tracing::info!(authority, "Third-party sign-in enabled");
    }

    let ai_provider: Arc<dyn AIProvider> = match &config.ai.openai_api_key {
        Some(key) if config.ai.has_openai() => {
            let mut openai = OpenAIConfig::new(key.clone())
                .with_model(config.ai.model.clone())
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries);
            if let Some(url) = &config.ai.base_url {
                openai = openai.with_base_url(url.clone());
            }
            Arc::new(OpenAIProvider::new(openai))
        }
        _ => {
            tracing::warn!("No OpenAI key configured - AI generation uses the mock provider");
            Arc::new(MockAIProvider::new())
        }
    };

    let payment = &config.payment;
    let (payment_provider, webhook_secret): (Arc<dyn PaymentProvider>, Option<SecretString>) =
        match (&payment.stripe_secret_key, payment.is_configured()) {
            (Some(key), true) => {
                let stripe = StripeConfig::new(
                    key.clone(),
                    payment.pro_price_id.clone(),
                    payment.success_url.clone(),
                    payment.cancel_url.clone(),
                );
                if payment.is_test_mode() {
                    tracing::info!("Stripe running in test mode");
                }
                (
                    Arc::new(StripePaymentProvider::new(stripe)),
                    payment.stripe_webhook_secret.clone(),
                )
            }
            _ => {
                tracing::warn!("Stripe not configured - checkout uses the mock provider");
                (Arc::new(MockPaymentProvider::new()), None)
            }
        };

    let rate_limiter = Arc::new(InMemoryRateLimiter::new());
    spawn_rate_limit_pruner(rate_limiter.clone());

    let state = AppState {
        accounts: stores.accounts,
        rooms: stores.rooms,
        clans: stores.clans,
        sessions: stores.sessions,
        questions: stores.questions,
        stats: stores.stats,
        achievements: stores.achievements,
        games: stores.games,
        webhook_events: stores.webhook_events,
        session_validator: Arc::new(CompositeSessionValidator::new(validators)),
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        token_issuer: jwt,
        ai_provider,
        payment_provider,
        rate_limiter,
        rate_limits: config.rate_limit.clone(),
        stripe_webhook_secret: webhook_secret,
        max_source_chars: config.ai.max_source_chars,
    };

    let app = build_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON lines in production, human-readable output elsewhere.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn spawn_rate_limit_pruner(limiter: Arc<InMemoryRateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = limiter.prune().await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired rate limit windows");
            }
        }
    });
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the listener cannot be installed the
/// server keeps running rather than shutting down at startup.
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal, graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

struct Stores {
    accounts: Arc<dyn brain_battle::ports::AccountRepository>,
    rooms: Arc<dyn brain_battle::ports::RoomRepository>,
    clans: Arc<dyn brain_battle::ports::ClanRepository>,
    sessions: Arc<dyn brain_battle::ports::QuizSessionRepository>,
    questions: Arc<dyn brain_battle::ports::QuestionRepository>,
    stats: Arc<dyn brain_battle::ports::PlayerStatsRepository>,
    achievements: Arc<dyn brain_battle::ports::AchievementRepository>,
    games: Arc<dyn brain_battle::ports::GameResultRepository>,
    webhook_events: Arc<dyn brain_battle::ports::WebhookEventRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            rooms: Arc::new(InMemoryRoomRepository::new()),
            clans: Arc::new(InMemoryClanRepository::new()),
            sessions: Arc::new(InMemoryQuizSessionRepository::new()),
            questions: Arc::new(InMemoryQuestionRepository::new()),
            stats: Arc::new(InMemoryPlayerStatsRepository::new()),
            achievements: Arc::new(InMemoryAchievementRepository::new()),
            games: Arc::new(InMemoryGameResultRepository::new()),
            webhook_events: Arc::new(InMemoryWebhookEventRepository::new()),
        }
    }

    fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
            rooms: Arc::new(PostgresRoomRepository::new(pool.clone())),
            clans: Arc::new(PostgresClanRepository::new(pool.clone())),
            sessions: Arc::new(PostgresQuizSessionRepository::new(pool.clone())),
            questions: Arc::new(PostgresQuestionRepository::new(pool.clone())),
            stats: Arc::new(PostgresPlayerStatsRepository::new(pool.clone())),
            achievements: Arc::new(PostgresAchievementRepository::new(pool.clone())),
            games: Arc::new(PostgresGameResultRepository::new(pool.clone())),
            webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_signal_listener_keeps_the_server_running() {
        let failing = async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no signal handler")) };

        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(failing)).await;

        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn signal_resolves_shutdown() {
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(async { Ok(()) })).await;

        assert!(waited.is_ok());
    }
}
