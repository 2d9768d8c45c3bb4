//! Payment provider double that records checkout requests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentProvider};

#[derive(Debug, Clone, Default)]
pub struct MockPaymentProvider {
    requests: Arc<Mutex<Vec<CheckoutRequest>>>,
    failing: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every checkout fails with `PaymentError`.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<CheckoutRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, DomainError> {
        if self.failing {
            return Err(DomainError::new(ErrorCode::PaymentError, "Payment provider is unavailable"));
        }
        let mut requests = lock(&self.requests);
        let id = format!("cs_test_{}", requests.len() + 1);
        requests.push(request);
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/{}", id),
            id,
        })
    }
}
