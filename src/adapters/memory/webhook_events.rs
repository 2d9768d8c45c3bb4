//! In-memory webhook idempotency store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, WebhookEventRecord, WebhookEventRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryWebhookEventRepository {
    records: Arc<RwLock<HashMap<String, WebhookEventRecord>>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn exists(&self, event_id: &str) -> Result<bool, DomainError> {
        Ok(self.records.read().await.contains_key(event_id))
    }

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.event_id) {
            Ok(SaveResult::AlreadyExists)
        } else {
            records.insert(record.event_id.clone(), record);
            Ok(SaveResult::Inserted)
        }
    }

    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before_count = records.len();
        records.retain(|_, r| r.processed_at >= timestamp);
        Ok((before_count - records.len()) as u64)
    }
}
