//! LoginHandler - email and password sign-in for local accounts.

use std::sync::Arc;

use crate::domain::account::Email;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AccountRepository, PasswordHasher, TokenIssuer};

use super::SignedIn;

#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

pub struct LoginHandler {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

fn invalid_credentials() -> DomainError {
    DomainError::new(ErrorCode::InvalidCredentials, "Invalid email or password")
}

impl LoginHandler {
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

    /// Unknown emails, third-party accounts and wrong passwords all look the same.
    pub async fn handle(&self, cmd: LoginCommand) -> Result<SignedIn, DomainError> {
        let email = Email::parse(&cmd.email).map_err(|_| invalid_credentials())?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;
        let hash = account.password_hash.as_deref().ok_or_else(invalid_credentials)?;

        if !self.hasher.verify(&cmd.password, hash)? {
            tracing::debug!(user_id = %account.id, "Rejected login with wrong password");
            return Err(invalid_credentials());
        }

        let token = self.tokens.issue(&account)?;
        Ok(SignedIn { account, token })
    }
}
