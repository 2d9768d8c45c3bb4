use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::WebhookOutcome;
use crate::ports::CheckoutSession;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.id,
            url: session.url,
        }
    }
}

/// Body returned to Stripe. Any 2xx stops redelivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    /// `applied`, `ignored` or `duplicate`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        let (status, detail) = match outcome {
            WebhookOutcome::Applied { event_type } => ("applied", Some(event_type)),
            WebhookOutcome::Ignored { reason } => ("ignored", Some(reason)),
            WebhookOutcome::Duplicate => ("duplicate", None),
        };
        Self {
            received: true,
            status: status.to_string(),
            detail,
        }
    }
}
