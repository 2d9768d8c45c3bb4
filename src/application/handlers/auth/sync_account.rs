//! SyncAccountHandler - provisions a local record for a third-party identity.

use std::sync::Arc;

use crate::domain::account::{validate_display_name, Email, UserAccount, MAX_DISPLAY_NAME_LENGTH};
use crate::domain::foundation::{AuthenticatedUser, DomainError, ErrorCode, IdentityProvider};
use crate::ports::AccountRepository;

#[derive(Debug, Clone)]
pub struct SyncAccountResult {
    pub account: UserAccount,
    /// False when the account already existed.
    pub created: bool,
}

pub struct SyncAccountHandler {
    accounts: Arc<dyn AccountRepository>,
}

impl SyncAccountHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Idempotent: the first call creates the account, later calls return it.
    pub async fn handle(&self, user: &AuthenticatedUser) -> Result<SyncAccountResult, DomainError> {
        if let Some(account) = self.accounts.find_by_id(&user.id).await? {
            return Ok(SyncAccountResult {
                account,
                created: false,
            });
        }

        if user.provider == IdentityProvider::Local {
            return Err(DomainError::new(ErrorCode::UserNotFound, "Account no longer exists"));
        }

        let email = Email::parse(&user.email)?;
        let display_name = display_name_for(user, &email)?;
        let account = UserAccount::third_party(user.id.clone(), email, display_name);
        self.accounts.create(&account).await?;

        tracing::info!(user_id = %account.id, "Provisioned third-party account");

        Ok(SyncAccountResult {
            account,
            created: true,
        })
    }
}

/// Token name claim if usable, otherwise the email's local part.
fn display_name_for(user: &AuthenticatedUser, email: &Email) -> Result<String, DomainError> {
    if let Some(name) = user.display_name.as_deref() {
        if let Ok(name) = validate_display_name(name) {
            return Ok(name);
        }
    }
    let local: String = email
        .as_str()
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .take(MAX_DISPLAY_NAME_LENGTH)
        .collect();
    Ok(validate_display_name(&local)?)
}
