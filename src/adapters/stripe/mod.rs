//! Stripe adapters.
//!
//! Webhook signature checking lives in `domain::billing`; this module only
//! makes outbound calls.

mod checkout;
mod mock;

pub use checkout::{StripeConfig, StripePaymentProvider};
pub use mock::MockPaymentProvider;
