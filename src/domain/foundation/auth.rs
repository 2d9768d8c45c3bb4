//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what every protected handler sees, regardless of
//! whether the bearer token was issued by our own login endpoint or by a
//! third-party identity provider. Both paths populate it through the
//! `SessionValidator` port.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::UserId;

/// Where an identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityProvider {
    /// Email + password account issued by this service.
    Local,
    /// OIDC provider (Google, Zitadel, ...).
    ThirdParty,
}

impl IdentityProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Local => "local",
            IdentityProvider::ThirdParty => "third_party",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(IdentityProvider::Local),
            "third_party" => Some(IdentityProvider::ThirdParty),
            _ => None,
        }
    }
}

/// Authenticated user extracted from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    /// From the `name` or `preferred_username` claim, when present.
    pub display_name: Option<String>,
    pub email_verified: bool,
    pub provider: IdentityProvider,
}

impl AuthenticatedUser {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
        email_verified: bool,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            email_verified,
            provider: IdentityProvider::Local,
        }
    }

    pub fn with_provider(mut self, provider: IdentityProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Returns the user's display name, or email as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing, malformed, or bad signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UserNotFound
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    #[test]
    fn new_user_defaults_to_local_provider() {
        let user = AuthenticatedUser::new(test_user_id(), "a@example.com", None, false);
        assert_eq!(user.provider, IdentityProvider::Local);

        let user = user.with_provider(IdentityProvider::ThirdParty);
        assert_eq!(user.provider, IdentityProvider::ThirdParty);
    }

    #[test]
    fn display_name_or_email_prefers_name() {
        let named = AuthenticatedUser::new(
            test_user_id(),
            "alice@example.com",
            Some("Alice".to_string()),
            true,
        );
        assert_eq!(named.display_name_or_email(), "Alice");

        let anonymous = AuthenticatedUser::new(test_user_id(), "bob@example.com", None, true);
        assert_eq!(anonymous.display_name_or_email(), "bob@example.com");
    }

    #[test]
    fn provider_parses_its_own_labels() {
        for p in [IdentityProvider::Local, IdentityProvider::ThirdParty] {
            assert_eq!(IdentityProvider::parse(p.as_str()), Some(p));
        }
        assert_eq!(IdentityProvider::parse("saml"), None);
    }

    #[test]
    fn auth_error_classification() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::InsufficientPermissions.requires_reauthentication());
        assert!(AuthError::service_unavailable("timeout").is_transient());
        assert!(!AuthError::InvalidToken.is_transient());
    }

    #[test]
    fn service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }
}
