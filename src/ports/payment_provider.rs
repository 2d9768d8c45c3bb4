//! Payment provider port for hosted subscription checkout.
//!
//! Subscription state changes arrive later through the Stripe webhook, so
//! the only outbound call the application makes is opening a checkout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a hosted checkout page for a subscription.
    ///
    /// # Errors
    ///
    /// - `PaymentError` if the provider rejects the request or is unreachable
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, DomainError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Echoed back in the webhook as `metadata.user_id`.
    pub user_id: UserId,
    /// Prefills the checkout form.
    pub email: String,
    /// Reuses an existing Stripe customer when present.
    pub customer_id: Option<String>,
    pub tier: SubscriptionTier,
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// URL the client redirects to.
    pub url: String,
}
