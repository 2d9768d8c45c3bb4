//! Third-party sign-in through an OpenID Connect provider.
//!
//! Tokens are RS/ES-signed by the provider. Verification keys come from the
//! provider's JWKS endpoint, discovered through
//! `/.well-known/openid-configuration` unless an explicit URL is configured.
//! Keys are cached for `jwks_ttl`; a token whose `kid` is missing from the
//! cached set triggers one refetch, which covers key rotation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Header, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::foundation::{AuthError, AuthenticatedUser, IdentityProvider, UserId};
use crate::ports::SessionValidator;

const DEFAULT_JWKS_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Issuer URL; must equal the `iss` claim.
    pub authority: String,
    pub audience: String,
    /// Skips discovery when set.
    pub jwks_url: Option<String>,
    pub jwks_ttl: Duration,
}

impl OidcConfig {
    pub fn new(authority: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            audience: audience.into(),
            jwks_url: None,
            jwks_ttl: DEFAULT_JWKS_TTL,
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = Some(url.into());
        self
    }

    pub fn with_jwks_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_ttl = ttl;
        self
    }

    fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.authority.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    #[serde(default)]
    aud: AudienceClaim,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// `aud` is either a string or an array of strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum AudienceClaim {
    #[default]
    Missing,
    One(String),
    Many(Vec<String>),
}

impl AudienceClaim {
    fn includes(&self, expected: &str) -> bool {
        match self {
            AudienceClaim::Missing => false,
            AudienceClaim::One(aud) => aud == expected,
            AudienceClaim::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeys {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

pub struct OidcSessionValidator {
    config: OidcConfig,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedKeys>>>,
}

impl OidcSessionValidator {
    pub fn new(config: OidcConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            http_client,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, AuthError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            tracing::error!(url, error = %e, "Identity provider request failed");
            AuthError::service_unavailable(format!("Failed to reach identity provider: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, %status, "Identity provider returned an error");
            return Err(AuthError::service_unavailable(format!(
                "Identity provider returned {}",
                status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(url, error = %e, "Identity provider response was not valid JSON");
            AuthError::service_unavailable(format!("Malformed identity provider response: {}", e))
        })
    }

    async fn resolve_jwks_url(&self) -> Result<String, AuthError> {
        match &self.config.jwks_url {
            Some(url) => Ok(url.clone()),
            None => {
                let doc: DiscoveryDocument = self.get_json(&self.config.discovery_url()).await?;
                Ok(doc.jwks_uri)
            }
        }
    }

    async fn refresh_keys(&self) -> Result<JwkSet, AuthError> {
        let url = self.resolve_jwks_url().await?;
        let keys: JwkSet = self.get_json(&url).await?;
        tracing::debug!(count = keys.keys.len(), "Fetched identity provider signing keys");

        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    async fn cached_keys(&self) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|c| c.is_fresh(self.config.jwks_ttl))
            .map(|c| c.keys.clone())
    }

    async fn key_for(&self, header: &Header) -> Result<(DecodingKey, Algorithm), AuthError> {
        let kid = header.kid.as_deref().ok_or_else(|| {
            tracing::warn!("Provider token has no kid header");
            AuthError::InvalidToken
        })?;

        if let Some(keys) = self.cached_keys().await {
            if let Some(found) = select_key(&keys, kid) {
                return found;
            }
        }

        // Unknown kid: the provider may have rotated keys.
        let keys = self.refresh_keys().await?;
        select_key(&keys, kid).unwrap_or_else(|| {
            tracing::warn!(kid, "No provider signing key matches token");
            Err(AuthError::InvalidToken)
        })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.config.authority]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

fn select_key(keys: &JwkSet, kid: &str) -> Option<Result<(DecodingKey, Algorithm), AuthError>> {
    let jwk = keys.find(kid)?;

    let algorithm = match jwk.common.key_algorithm {
        None | Some(KeyAlgorithm::RS256) => Algorithm::RS256,
        Some(KeyAlgorithm::RS384) => Algorithm::RS384,
        Some(KeyAlgorithm::RS512) => Algorithm::RS512,
        Some(KeyAlgorithm::ES256) => Algorithm::ES256,
        Some(KeyAlgorithm::ES384) => Algorithm::ES384,
        Some(other) => {
            tracing::warn!(?other, "Unsupported provider key algorithm");
            return Some(Err(AuthError::InvalidToken));
        }
    };

    Some(
        DecodingKey::from_jwk(jwk)
            .map(|key| (key, algorithm))
            .map_err(|e| {
                tracing::warn!(error = %e, "Provider key could not be loaded");
                AuthError::InvalidToken
            }),
    )
}

#[async_trait]
impl SessionValidator for OidcSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let (key, algorithm) = self.key_for(&header).await?;

        let data = decode::<ProviderClaims>(token, &key, &self.validation(algorithm)).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::warn!(error = %e, "Provider token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;
        let claims = data.claims;

        if !claims.aud.includes(&self.config.audience) {
            return Err(AuthError::InvalidToken);
        }

        let email = claims.email.ok_or_else(|| {
            tracing::warn!("Provider token has no email claim");
            AuthError::InvalidToken
        })?;
        let user_id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser::new(
            user_id,
            email,
            claims.name.or(claims.preferred_username),
            claims.email_verified.unwrap_or(false),
        )
        .with_provider(IdentityProvider::ThirdParty))
    }
}

impl std::fmt::Debug for OidcSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcSessionValidator")
            .field("authority", &self.config.authority)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}
