//! GetAccountHandler - the caller's account record.

use std::sync::Arc;

use crate::domain::account::UserAccount;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::AccountRepository;

pub struct GetAccountHandler {
    accounts: Arc<dyn AccountRepository>,
}

impl GetAccountHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Third-party users get `USER_NOT_FOUND` until they have synced.
    pub async fn handle(&self, user_id: &UserId) -> Result<UserAccount, DomainError> {
        self.accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "Account not found"))
    }
}
