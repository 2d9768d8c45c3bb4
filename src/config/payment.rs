//! Payment configuration (Stripe)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub stripe_secret_key: Option<SecretString>,

    pub stripe_webhook_secret: Option<SecretString>,

    /// Price of the Pro subscription.
    #[serde(default)]
    pub pro_price_id: String,

    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
}

fn non_empty(secret: &Option<SecretString>) -> Option<&str> {
    secret
        .as_ref()
        .map(|s| s.expose_secret().as_str())
        .filter(|s| !s.is_empty())
}

impl PaymentConfig {
    /// Both keys are present; otherwise billing runs against the mock provider.
    pub fn is_configured(&self) -> bool {
        non_empty(&self.stripe_secret_key).is_some() && non_empty(&self.stripe_webhook_secret).is_some()
    }

    pub fn is_test_mode(&self) -> bool {
        non_empty(&self.stripe_secret_key).is_some_and(|k| k.starts_with("sk_test_"))
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let key = non_empty(&self.stripe_secret_key);
        let webhook_secret = non_empty(&self.stripe_webhook_secret);

        if environment == Environment::Production {
            if key.is_none() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_SECRET_KEY"));
            }
            if webhook_secret.is_none() {
                return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
            }
            if self.pro_price_id.is_empty() {
                return Err(ValidationError::MissingRequired("PAYMENT__PRO_PRICE_ID"));
            }
        }

        if key.is_some_and(|k| !k.starts_with("sk_")) {
            return Err(ValidationError::InvalidStripeKey);
        }
        if webhook_secret.is_some_and(|s| !s.starts_with("whsec_")) {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            pro_price_id: String::new(),
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
        }
    }
}

fn default_success_url() -> String {
    "http://localhost:5173/billing/success".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:5173/billing".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Option<SecretString> {
        Some(SecretString::new(s.to_string()))
    }

    fn stripe(key: &str, webhook: &str) -> PaymentConfig {
        PaymentConfig {
            stripe_secret_key: secret(key),
            stripe_webhook_secret: secret(webhook),
            pro_price_id: "price_pro".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_is_fine_in_development() {
        let config = PaymentConfig::default();
        assert!(!config.is_configured());
        assert!(config.validate(Environment::Development).is_ok());
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_SECRET_KEY"))
        );
    }

    #[test]
    fn test_mode_is_detected() {
        assert!(stripe("sk_test_abc", "whsec_abc").is_test_mode());
        assert!(!stripe("sk_live_abc", "whsec_abc").is_test_mode());
    }

    #[test]
    fn key_prefixes_are_checked() {
        assert_eq!(
            stripe("pk_test_abc", "whsec_abc").validate(Environment::Development),
            Err(ValidationError::InvalidStripeKey)
        );
        assert_eq!(
            stripe("sk_test_abc", "secret_abc").validate(Environment::Development),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn production_needs_price_id() {
        let config = PaymentConfig {
            pro_price_id: String::new(),
            ..stripe("sk_live_abc", "whsec_abc")
        };
        assert_eq!(
            config.validate(Environment::Production),
            Err(ValidationError::MissingRequired("PAYMENT__PRO_PRICE_ID"))
        );
        assert!(stripe("sk_live_abc", "whsec_abc").validate(Environment::Production).is_ok());
    }
}
