//! Session validation port for bearer token validation.
//!
//! Implementations exist for locally issued HS256 tokens, for third-party
//! OIDC tokens checked against the provider's JWKS, and a composite that
//! tries them in order.
//!
//! All implementations MUST validate:
//! - **Issuer (iss)**: Token must come from the expected issuer
//! - **Expiry (exp)**: Token must not be expired
//! - **Audience (aud)**: for third-party tokens, the configured client

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed tokens or bad signatures
/// - `AuthError::TokenExpired` for expired tokens
/// - `AuthError::ServiceUnavailable` for transient errors (JWKS unreachable)
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
