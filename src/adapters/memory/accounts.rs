//! In-memory account store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Email, UserAccount};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{AccountRepository, SubscriptionUpdate};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<UserId, UserAccount>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DomainError::new(ErrorCode::EmailTaken, "Email is already registered"));
        }
        if accounts.contains_key(&account.id) {
            return Err(DomainError::new(ErrorCode::Conflict, "Account already exists"));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| &a.email == email).cloned())
    }

    async fn find_by_stripe_customer(&self, customer_id: &str) -> Result<Option<UserAccount>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.stripe_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn update_subscription(&self, id: &UserId, update: SubscriptionUpdate) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "Account not found"))?;

        account.tier = update.tier;
        if let Some(customer_id) = update.stripe_customer_id {
            account.stripe_customer_id = Some(customer_id);
        }
        if let Some(subscription_id) = update.stripe_subscription_id {
            account.stripe_subscription_id = Some(subscription_id);
        }
        account.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionTier;

    fn account(email: &str) -> UserAccount {
        UserAccount::local(Email::parse(email).unwrap(), "Player".to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account("a@example.com")).await.unwrap();

        let err = repo.create(&account("A@Example.com")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmailTaken);
    }

    #[tokio::test]
    async fn subscription_update_keeps_existing_ids_when_absent() {
        let repo = InMemoryAccountRepository::new();
        let acct = account("b@example.com");
        repo.create(&acct).await.unwrap();

        repo.update_subscription(
            &acct.id,
            SubscriptionUpdate {
                tier: SubscriptionTier::Pro,
                stripe_customer_id: Some("cus_1".to_string()),
                stripe_subscription_id: Some("sub_1".to_string()),
            },
        )
        .await
        .unwrap();
        repo.update_subscription(&acct.id, SubscriptionUpdate::tier_only(SubscriptionTier::Free))
            .await
            .unwrap();

        let stored = repo.find_by_stripe_customer("cus_1").await.unwrap().unwrap();
        assert_eq!(stored.tier, SubscriptionTier::Free);
        assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_1"));
    }

    #[tokio::test]
    async fn updating_unknown_account_is_not_found() {
        let repo = InMemoryAccountRepository::new();
        let err = repo
            .update_subscription(&UserId::generate(), SubscriptionUpdate::tier_only(SubscriptionTier::Pro))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
