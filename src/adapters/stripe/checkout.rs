//! Stripe Checkout adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentProvider};

#[derive(Debug, Clone)]
pub struct StripeConfig {
    api_key: SecretString,
    pub pro_price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub api_base_url: String,
}

impl StripeConfig {
    pub fn new(
        api_key: SecretString,
        pro_price_id: impl Into<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key,
            pro_price_id: pro_price_id.into(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

pub struct StripePaymentProvider {
    config: StripeConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeCheckoutSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

fn payment_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::PaymentError, message)
}

impl StripePaymentProvider {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn price_for(&self, tier: SubscriptionTier) -> Result<&str, DomainError> {
        match tier {
            SubscriptionTier::Pro => Ok(&self.config.pro_price_id),
            SubscriptionTier::Free => Err(DomainError::validation("tier", "The free tier needs no checkout")),
        }
    }

    fn form_params(&self, request: &CheckoutRequest) -> Result<Vec<(&'static str, String)>, DomainError> {
        let mut params = vec![
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", self.price_for(request.tier)?.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", self.config.success_url.clone()),
            ("cancel_url", self.config.cancel_url.clone()),
            ("client_reference_id", request.user_id.to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
            ("subscription_data[metadata][user_id]", request.user_id.to_string()),
        ];
        match &request.customer_id {
            Some(customer) => params.push(("customer", customer.clone())),
            None => params.push(("customer_email", request.email.clone())),
        }
        Ok(params)
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentProvider {
    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, DomainError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = self.form_params(&request)?;

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Stripe request failed");
                payment_error("Payment provider is unreachable")
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Stripe rejected checkout session");
            return Err(payment_error(format!("Stripe returned {}", status)));
        }

        let session: StripeCheckoutSession = response
            .json()
            .await
            .map_err(|e| payment_error(format!("Failed to parse Stripe response: {}", e)))?;
        let url = session
            .url
            .unwrap_or_else(|| format!("https://checkout.stripe.com/c/pay/{}", session.id));

        tracing::info!(user_id = %request.user_id, session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession { id: session.id, url })
    }
}
