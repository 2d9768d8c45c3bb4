//! Billing module - subscription tiers and Stripe webhook handling.

mod event;
mod tier;
mod webhook;

pub use event::{AccountRef, BillingAction, StripeEvent, StripeEventData};
pub use tier::{StripeSubscriptionStatus, SubscriptionTier};
pub use webhook::{SignatureHeader, StripeWebhookVerifier, WebhookError};
