//! Account repository port.

use async_trait::async_trait;

use crate::domain::account::{Email, UserAccount};
use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, UserId};

/// Billing fields changed by checkout and subscription webhooks.
///
/// `None` identifiers leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub tier: SubscriptionTier,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}

impl SubscriptionUpdate {
    pub fn tier_only(tier: SubscriptionTier) -> Self {
        Self {
            tier,
            stripe_customer_id: None,
            stripe_subscription_id: None,
        }
    }
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// - `EmailTaken` if another account already uses the email
    /// - `Conflict` if the id already exists
    async fn create(&self, account: &UserAccount) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, DomainError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<UserAccount>, DomainError>;

    async fn find_by_stripe_customer(&self, customer_id: &str) -> Result<Option<UserAccount>, DomainError>;

    /// Applies a billing change.
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the account doesn't exist
    async fn update_subscription(&self, id: &UserId, update: SubscriptionUpdate) -> Result<(), DomainError>;
}
