//! Locally issued access tokens.
//!
//! Accounts created through `/api/auth/register` sign in with a password and
//! receive an HS256 JWT minted here. The same service validates those tokens
//! on every protected request.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::account::UserAccount;
use crate::domain::foundation::{AuthError, AuthenticatedUser, DomainError, IdentityProvider, Timestamp, UserId};
use crate::ports::{IssuedToken, SessionValidator, TokenIssuer};

/// Claims carried by a local access token.
#[derive(Debug, Serialize, Deserialize)]
struct LocalClaims {
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    iss: String,
    iat: u64,
    exp: u64,
}

/// Issues and validates HS256 tokens for local accounts.
pub struct LocalJwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_secs: u64,
}

impl LocalJwtService {
    pub fn new(secret: &SecretString, issuer: impl Into<String>, ttl_secs: u64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            issuer: issuer.into(),
            ttl_secs,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false;
        validation
    }

    fn encode_claims(&self, claims: &LocalClaims) -> Result<String, DomainError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign access token: {}", e)))
    }
}

impl std::fmt::Debug for LocalJwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalJwtService")
            .field("issuer", &self.issuer)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer for LocalJwtService {
    fn issue(&self, account: &UserAccount) -> Result<IssuedToken, DomainError> {
        let issued_at = Timestamp::now();
        let expires_at = issued_at.plus_secs(self.ttl_secs);
        let claims = LocalClaims {
            sub: account.id.to_string(),
            email: account.email.as_str().to_string(),
            name: Some(account.display_name.clone()),
            iss: self.issuer.clone(),
            iat: issued_at.as_unix_secs(),
            exp: expires_at.as_unix_secs(),
        };
        let token = self.encode_claims(&claims)?;
        Ok(IssuedToken::bearer(token, expires_at))
    }
}

#[async_trait]
impl SessionValidator for LocalJwtService {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<LocalClaims>(token, &self.decoding_key, &self.validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let claims = data.claims;
        let user_id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(
            AuthenticatedUser::new(user_id, claims.email, claims.name, true)
                .with_provider(IdentityProvider::Local),
        )
    }
}
