//! Authentication configuration
//!
//! Local accounts get HS256 tokens signed with `jwt_secret`. Third-party
//! sign-in is enabled by setting `oidc_authority` and `oidc_audience`.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HS256 key length accepted in production.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: SecretString,

    /// `iss` claim of locally issued tokens.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,

    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    pub oidc_authority: Option<String>,

    pub oidc_audience: Option<String>,

    /// Overrides JWKS discovery.
    pub oidc_jwks_url: Option<String>,

    #[serde(default = "default_jwks_cache_ttl")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthConfig {
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }

    /// Authority and audience, when third-party sign-in is configured.
    pub fn oidc(&self) -> Option<(&str, &str)> {
        let authority = self.oidc_authority.as_deref().filter(|a| !a.is_empty())?;
        let audience = self.oidc_audience.as_deref().filter(|a| !a.is_empty())?;
        Some((authority, audience))
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if environment == Environment::Production && secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ValidationError::JwtSecretTooShort(MIN_JWT_SECRET_BYTES));
        }
        if !(60..=30 * 86_400).contains(&self.token_ttl_secs) {
            return Err(ValidationError::InvalidTokenTtl);
        }

        if let Some(authority) = self.oidc_authority.as_deref().filter(|a| !a.is_empty()) {
            if self.oidc_audience.as_deref().map_or(true, str::is_empty) {
                return Err(ValidationError::MissingRequired("AUTH__OIDC_AUDIENCE"));
            }
            if environment == Environment::Production && !authority.starts_with("https://") {
                return Err(ValidationError::AuthorityMustBeHttps);
            }
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            jwt_issuer: default_issuer(),
            token_ttl_secs: default_token_ttl(),
            oidc_authority: None,
            oidc_audience: None,
            oidc_jwks_url: None,
            jwks_cache_ttl_secs: default_jwks_cache_ttl(),
        }
    }
}

fn default_issuer() -> String {
    "brain-battle".to_string()
}

fn default_token_ttl() -> u64 {
    7 * 86_400
}

fn default_jwks_cache_ttl() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new(secret.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.jwt_issuer, "brain-battle");
        assert_eq!(config.token_ttl_secs, 604_800);
        assert_eq!(config.jwks_cache_ttl(), Duration::from_secs(3600));
        assert!(config.oidc().is_none());
    }

    #[test]
    fn missing_secret_is_rejected() {
        assert_eq!(
            AuthConfig::default().validate(Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn short_secret_is_only_allowed_outside_production() {
        let config = with_secret("dev-secret");
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::JwtSecretTooShort(32))
        );
    }

    #[test]
    fn token_ttl_is_bounded() {
        let config = AuthConfig {
            token_ttl_secs: 5,
            ..with_secret("dev-secret")
        };
        assert_eq!(config.validate(Environment::Development), Err(ValidationError::InvalidTokenTtl));
    }

    #[test]
    fn oidc_needs_audience_and_https_in_production() {
        let mut config = with_secret("a-very-long-production-signing-secret");
        config.oidc_authority = Some("http://accounts.example.com".to_string());
        assert_eq!(
            config.validate(Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__OIDC_AUDIENCE"))
        );

        config.oidc_audience = Some("brain-battle".to_string());
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::AuthorityMustBeHttps)
        );

        config.oidc_authority = Some("https://accounts.example.com".to_string());
        assert!(config.validate(Environment::Production).is_ok());
        assert_eq!(config.oidc(), Some(("https://accounts.example.com", "brain-battle")));
    }
}
