use axum::{routing::post, Router};

use crate::adapters::http::state::AppState;

use super::handlers::{create_checkout, stripe_webhook};

/// Routes mounted at `/api/billing`.
pub fn billing_routes() -> Router<AppState> {
    Router::new().route("/checkout", post(create_checkout))
}

/// Routes mounted at `/api/webhooks`. No user auth; requests are signed.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook))
}
