//! WebhookEventRepository port - tracking processed Stripe webhooks.
//!
//! Stripe may deliver the same event more than once (timeouts, retries after
//! a 5xx), so every event id is recorded and duplicates are acknowledged
//! without being applied again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Stripe event ID (evt_xxx format).
    pub event_id: String,
    /// e.g. "checkout.session.completed".
    pub event_type: String,
    pub processed_at: DateTime<Utc>,
    /// "success" or "ignored".
    pub result: String,
    /// Why the event was ignored, if it was.
    pub note: Option<String>,
}

impl WebhookEventRecord {
    pub fn success(event_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            result: "success".to_string(),
            note: None,
        }
    }

    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            result: "ignored".to_string(),
            note: Some(reason.into()),
        }
    }
}

/// Result of an insert keyed for idempotency (webhook events, game results).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// First time seeing this key.
    Inserted,
    /// Duplicate delivery or already recorded.
    AlreadyExists,
}

/// Implementations should use a PRIMARY KEY on `event_id` so concurrent
/// deliveries of the same event cannot both insert.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn exists(&self, event_id: &str) -> Result<bool, DomainError>;

    /// `ON CONFLICT DO NOTHING` semantics.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Deletes records older than `timestamp`, returning how many went.
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}
