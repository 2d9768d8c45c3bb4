//! Accepts tokens from any of several validators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Tries each validator in order; the first success wins.
///
/// Local tokens are checked first since that check needs no network. A
/// `ServiceUnavailable` from a later validator is only surfaced when no
/// validator accepted the token.
pub struct CompositeSessionValidator {
    validators: Vec<Arc<dyn SessionValidator>>,
}

impl CompositeSessionValidator {
    pub fn new(validators: Vec<Arc<dyn SessionValidator>>) -> Self {
        Self { validators }
    }
}

#[async_trait]
impl SessionValidator for CompositeSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut last_error = AuthError::InvalidToken;
        for validator in &self.validators {
            match validator.validate(token).await {
                Ok(user) => return Ok(user),
                // Expired beats unavailable: the client must re-authenticate either way.
                Err(AuthError::TokenExpired) => last_error = AuthError::TokenExpired,
                Err(err @ AuthError::ServiceUnavailable(_)) if last_error == AuthError::InvalidToken => {
                    last_error = err
                }
                Err(_) => {}
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;

    #[tokio::test]
    async fn falls_through_to_later_validators() {
        let local = MockSessionValidator::new().with_test_user("local-token", "local-user");
        let remote = MockSessionValidator::new().with_test_user("remote-token", "remote-user");
        let composite = CompositeSessionValidator::new(vec![Arc::new(local), Arc::new(remote)]);

        let user = composite.validate("remote-token").await.unwrap();
        assert_eq!(user.id.as_str(), "remote-user");
        assert!(composite.validate("local-token").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_tokens_nobody_accepts() {
        let composite = CompositeSessionValidator::new(vec![Arc::new(MockSessionValidator::new())]);
        assert_eq!(composite.validate("nope").await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn reports_provider_outage_when_no_validator_accepts() {
        let local = MockSessionValidator::new();
        let remote = MockSessionValidator::new().with_error(AuthError::service_unavailable("down"));
        let composite = CompositeSessionValidator::new(vec![Arc::new(local), Arc::new(remote)]);

        assert!(matches!(
            composite.validate("token").await.unwrap_err(),
            AuthError::ServiceUnavailable(_)
        ));
    }
}
