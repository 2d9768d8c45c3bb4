//! Stripe checkout and webhook endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CheckoutResponse, WebhookAck};
pub use routes::{billing_routes, webhook_routes};
