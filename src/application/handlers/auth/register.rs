//! RegisterHandler - creates a local account and signs it in.

use std::sync::Arc;

use crate::domain::account::{validate_display_name, validate_password, Email, UserAccount};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AccountRepository, IssuedToken, PasswordHasher, TokenIssuer};

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// An account together with a freshly issued access token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: UserAccount,
    pub token: IssuedToken,
}

pub struct RegisterHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl RegisterHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
        }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<SignedIn, DomainError> {
        let email = Email::parse(&cmd.email)?;
        validate_password(&cmd.password)?;
        let display_name = validate_display_name(&cmd.display_name)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(DomainError::new(ErrorCode::EmailTaken, "Email is already registered"));
        }

        let hash = self.hasher.hash(&cmd.password)?;
        let account = UserAccount::local(email, display_name, hash);
        // The store enforces uniqueness too; a racing sign-up surfaces as EmailTaken.
        self.accounts.create(&account).await?;

        tracing::info!(user_id = %account.id, "Registered local account");

        let token = self.tokens.issue(&account)?;
        Ok(SignedIn { account, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::LocalJwtService;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::application::handlers::auth::test_support::PlainHasher;
    use secrecy::SecretString;

    fn handler() -> (RegisterHandler, Arc<InMemoryAccountRepository>) {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let jwt = LocalJwtService::new(&SecretString::new("test-secret".to_string()), "brain-battle", 3600);
        let handler = RegisterHandler::new(accounts.clone(), Arc::new(PlainHasher), Arc::new(jwt));
        (handler, accounts)
    }

    fn command(email: &str) -> RegisterCommand {
        RegisterCommand {
            email: email.to_string(),
            password: "correct horse".to_string(),
            display_name: "Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn registers_and_issues_a_token() {
        let (handler, accounts) = handler();

        let signed_in = handler.handle(command("Ada@Example.com")).await.unwrap();

        assert_eq!(signed_in.account.email.as_str(), "ada@example.com");
        assert_eq!(signed_in.token.token_type, "Bearer");
        assert!(!signed_in.token.access_token.is_empty());
        let stored = accounts.find_by_id(&signed_in.account.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash.as_deref(), Some("plain$correct horse"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (handler, _) = handler();
        handler.handle(command("ada@example.com")).await.unwrap();

        let err = handler.handle(command("ADA@example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailTaken);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let (handler, _) = handler();
        let cmd = RegisterCommand {
            password: "short".to_string(),
            ..command("ada@example.com")
        };

        let err = handler.handle(cmd).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let (handler, _) = handler();
        let err = handler.handle(command("not-an-email")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
