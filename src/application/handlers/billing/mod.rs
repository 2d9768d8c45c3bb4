//! Billing handlers - Pro checkout and Stripe webhook processing.

mod handle_stripe_webhook;
mod start_checkout;

pub use handle_stripe_webhook::{HandleStripeWebhookCommand, HandleStripeWebhookHandler, WebhookOutcome};
pub use start_checkout::StartCheckoutHandler;
