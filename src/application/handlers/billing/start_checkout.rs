//! StartCheckoutHandler - opens a hosted checkout for the Pro plan.

use std::sync::Arc;

use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{AccountRepository, CheckoutRequest, CheckoutSession, PaymentProvider};

pub struct StartCheckoutHandler {
    accounts: Arc<dyn AccountRepository>,
    payments: Arc<dyn PaymentProvider>,
}

impl StartCheckoutHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, payments: Arc<dyn PaymentProvider>) -> Self {
        Self { accounts, payments }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<CheckoutSession, DomainError> {
        let account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "Account not found"))?;

        if account.tier.is_paid() {
            return Err(DomainError::new(ErrorCode::Conflict, "Already subscribed to Pro"));
        }

        let session = self
            .payments
            .create_checkout_session(CheckoutRequest {
                user_id: account.id.clone(),
                email: account.email.as_str().to_string(),
                customer_id: account.stripe_customer_id.clone(),
                tier: SubscriptionTier::Pro,
            })
            .await?;

        tracing::info!(user_id = %user_id, checkout_session = %session.id, "Checkout started");
        Ok(session)
    }
}
