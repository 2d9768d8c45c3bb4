//! Stripe webhook events and what they mean for an account.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::tier::{StripeSubscriptionStatus, SubscriptionTier};
use super::webhook::WebhookError;

/// The parts of a Stripe event we read. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created: i64,
    pub data: StripeEventData,
    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: String,
    status: StripeSubscriptionStatus,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    customer: Option<String>,
}

/// How to find the account an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    User(UserId),
    StripeCustomer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingAction {
    /// A checkout finished: link the Stripe customer and upgrade.
    ActivateSubscription {
        user_id: UserId,
        customer_id: String,
        subscription_id: Option<String>,
    },
    SetTier {
        account: AccountRef,
        tier: SubscriptionTier,
    },
    PaymentFailed {
        customer_id: String,
    },
    Ignore {
        reason: String,
    },
}

impl StripeEvent {
    fn object<T: serde::de::DeserializeOwned>(&self) -> Result<T, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("{}: {}", self.event_type, e)))
    }

    /// Decides what the event means for billing state.
    pub fn action(&self) -> Result<BillingAction, WebhookError> {
        match self.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = self.object()?;
                let user_id = session
                    .metadata
                    .get("user_id")
                    .cloned()
                    .or(session.client_reference_id)
                    .ok_or(WebhookError::MissingField("metadata.user_id"))?;
                let user_id = UserId::new(user_id)
                    .map_err(|_| WebhookError::MissingField("metadata.user_id"))?;
                let customer_id = session
                    .customer
                    .ok_or(WebhookError::MissingField("customer"))?;
                Ok(BillingAction::ActivateSubscription {
                    user_id,
                    customer_id,
                    subscription_id: session.subscription,
                })
            }
            "customer.subscription.updated" => {
                let sub: SubscriptionObject = self.object()?;
                match sub.status.implied_tier() {
                    Some(tier) => Ok(BillingAction::SetTier {
                        account: AccountRef::StripeCustomer(sub.customer),
                        tier,
                    }),
                    None => Ok(BillingAction::Ignore {
                        reason: format!("subscription {} in transitional state", sub.id),
                    }),
                }
            }
            "customer.subscription.deleted" => {
                let sub: SubscriptionObject = self.object()?;
                Ok(BillingAction::SetTier {
                    account: AccountRef::StripeCustomer(sub.customer),
                    tier: SubscriptionTier::Free,
                })
            }
            "invoice.payment_failed" => {
                let invoice: InvoiceObject = self.object()?;
                let customer_id = invoice
                    .customer
                    .ok_or(WebhookError::MissingField("customer"))?;
                Ok(BillingAction::PaymentFailed { customer_id })
            }
            other => Ok(BillingAction::Ignore {
                reason: format!("unhandled event type {}", other),
            }),
        }
    }
}
