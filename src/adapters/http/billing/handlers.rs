use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::state::AppState;
use crate::application::handlers::billing::HandleStripeWebhookCommand;
use crate::domain::billing::WebhookError;

use super::dto::{CheckoutResponse, WebhookAck};

const STRIPE_SIGNATURE: &str = "stripe-signature";

/// POST /api/billing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.checkout_handler().handle(&user.id).await?;
    Ok(Json(CheckoutResponse::from(session)))
}

/// POST /api/webhooks/stripe
///
/// Unauthenticated; trust comes from the `Stripe-Signature` header. Storage
/// failures answer 500 so Stripe redelivers.
pub async fn stripe_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(handler) = state.webhook_handler() else {
        return webhook_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Billing is not configured",
        );
    };

    let Some(signature) = headers.get(STRIPE_SIGNATURE).and_then(|v| v.to_str().ok()) else {
        return webhook_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "Missing Stripe-Signature header",
        );
    };

    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match handler.handle(cmd).await {
        Ok(outcome) => (StatusCode::OK, Json(WebhookAck::from(outcome))).into_response(),
        Err(e) => {
            let status = webhook_status(&e);
            if status.is_server_error() {
                tracing::error!(error = %e, "Stripe webhook failed");
            } else {
                tracing::warn!(error = %e, "Stripe webhook rejected");
            }
            let code = if e.is_authentication_failure() {
                "UNAUTHORIZED"
            } else if status.is_server_error() {
                "INTERNAL_ERROR"
            } else {
                "VALIDATION_FAILED"
            };
            webhook_error(status, code, &e.to_string())
        }
    }
}

fn webhook_status(error: &WebhookError) -> StatusCode {
    if error.is_authentication_failure() {
        StatusCode::UNAUTHORIZED
    } else if error.is_retryable() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

fn webhook_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_errors_map_to_statuses() {
        assert_eq!(webhook_status(&WebhookError::InvalidSignature), StatusCode::UNAUTHORIZED);
        assert_eq!(webhook_status(&WebhookError::TimestampOutOfRange), StatusCode::UNAUTHORIZED);
        assert_eq!(
            webhook_status(&WebhookError::Database("timeout".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            webhook_status(&WebhookError::ParseError("bad json".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
