//! HandleStripeWebhookHandler - verifies and applies Stripe subscription events.
//!
//! Every processed event id is recorded; redeliveries are acknowledged
//! without touching the account again.

use std::sync::Arc;

use crate::domain::billing::{AccountRef, BillingAction, StripeWebhookVerifier, SubscriptionTier, WebhookError};
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{AccountRepository, SaveResult, SubscriptionUpdate, WebhookEventRecord, WebhookEventRepository};

#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied { event_type: String },
    Ignored { reason: String },
    Duplicate,
}

pub struct HandleStripeWebhookHandler {
    verifier: StripeWebhookVerifier,
    accounts: Arc<dyn AccountRepository>,
    events: Arc<dyn WebhookEventRepository>,
}

fn storage(err: DomainError) -> WebhookError {
    WebhookError::Database(err.to_string())
}

impl HandleStripeWebhookHandler {
    pub fn new(
        verifier: StripeWebhookVerifier,
        accounts: Arc<dyn AccountRepository>,
        events: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            verifier,
            accounts,
            events,
        }
    }

    pub async fn handle(&self, cmd: HandleStripeWebhookCommand) -> Result<WebhookOutcome, WebhookError> {
        let event = self.verifier.verify_and_parse(&cmd.payload, &cmd.signature)?;

        if self.events.exists(&event.id).await.map_err(storage)? {
            tracing::debug!(event_id = %event.id, "Duplicate webhook delivery");
            return Ok(WebhookOutcome::Duplicate);
        }

        let (record, outcome) = match event.action()? {
            BillingAction::ActivateSubscription {
                user_id,
                customer_id,
                subscription_id,
            } => {
                self.apply(
                    &user_id,
                    SubscriptionUpdate {
                        tier: SubscriptionTier::Pro,
                        stripe_customer_id: Some(customer_id),
                        stripe_subscription_id: subscription_id,
                    },
                )
                .await?;
                tracing::info!(user_id = %user_id, "Subscription activated");
                self.applied(&event.id, &event.event_type)
            }
            BillingAction::SetTier { account, tier } => {
                let user_id = self.resolve(account).await?;
                self.apply(&user_id, SubscriptionUpdate::tier_only(tier)).await?;
                tracing::info!(user_id = %user_id, tier = %tier, "Subscription tier changed");
                self.applied(&event.id, &event.event_type)
            }
            BillingAction::PaymentFailed { customer_id } => {
                tracing::warn!(customer_id = %customer_id, event_id = %event.id, "Subscription payment failed");
                self.applied(&event.id, &event.event_type)
            }
            BillingAction::Ignore { reason } => {
                tracing::debug!(event_id = %event.id, reason = %reason, "Webhook ignored");
                (
                    WebhookEventRecord::ignored(&event.id, &event.event_type, reason.clone()),
                    WebhookOutcome::Ignored { reason },
                )
            }
        };

        match self.events.save(record).await.map_err(storage)? {
            SaveResult::Inserted => Ok(outcome),
            // a concurrent delivery won the insert; both applied the same idempotent update
            SaveResult::AlreadyExists => Ok(WebhookOutcome::Duplicate),
        }
    }

    fn applied(&self, event_id: &str, event_type: &str) -> (WebhookEventRecord, WebhookOutcome) {
        (
            WebhookEventRecord::success(event_id, event_type),
            WebhookOutcome::Applied {
                event_type: event_type.to_string(),
            },
        )
    }

    async fn resolve(&self, account: AccountRef) -> Result<UserId, WebhookError> {
        match account {
            AccountRef::User(user_id) => Ok(user_id),
            AccountRef::StripeCustomer(customer_id) => self
                .accounts
                .find_by_stripe_customer(&customer_id)
                .await
                .map_err(storage)?
                .map(|a| a.id)
                .ok_or(WebhookError::AccountNotFound),
        }
    }

    async fn apply(&self, user_id: &UserId, update: SubscriptionUpdate) -> Result<(), WebhookError> {
        self.accounts
            .update_subscription(user_id, update)
            .await
            .map_err(|e| {
                if e.code.is_not_found() {
                    WebhookError::AccountNotFound
                } else {
                    storage(e)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAccountRepository, InMemoryWebhookEventRepository};
    use crate::domain::account::{Email, UserAccount};
    use secrecy::SecretString;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    struct Fixture {
        handler: HandleStripeWebhookHandler,
        accounts: Arc<InMemoryAccountRepository>,
        account: UserAccount,
    }

    async fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let account = UserAccount::local(
            Email::parse("ada@example.com").unwrap(),
            "Ada".to_string(),
            "hash".to_string(),
        );
        accounts.create(&account).await.unwrap();
        let handler = HandleStripeWebhookHandler::new(
            StripeWebhookVerifier::new(SecretString::new(SECRET.to_string())),
            accounts.clone(),
            Arc::new(InMemoryWebhookEventRepository::new()),
        );
        Fixture {
            handler,
            accounts,
            account,
        }
    }

    fn signed(event: serde_json::Value) -> HandleStripeWebhookCommand {
        let payload = serde_json::to_vec(&event).unwrap();
        let verifier = StripeWebhookVerifier::new(SecretString::new(SECRET.to_string()));
        let signature = verifier
            .signature_header(chrono::Utc::now().timestamp(), &payload)
            .unwrap();
        HandleStripeWebhookCommand { payload, signature }
    }

    fn checkout_completed(id: &str, user_id: &UserId) -> serde_json::Value {
        json!({
            "id": id,
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": {"object": {
                "customer": "cus_123",
                "subscription": "sub_123",
                "metadata": {"user_id": user_id.to_string()}
            }}
        })
    }

    async fn tier_of(fx: &Fixture) -> SubscriptionTier {
        fx.accounts.find_by_id(&fx.account.id).await.unwrap().unwrap().tier
    }

    #[tokio::test]
    async fn checkout_upgrades_once_and_dedups_redelivery() {
        let fx = fixture().await;
        let cmd = signed(checkout_completed("evt_1", &fx.account.id));

        let first = fx.handler.handle(cmd.clone()).await.unwrap();
        assert!(matches!(first, WebhookOutcome::Applied { .. }));
        assert_eq!(fx.handler.handle(cmd).await.unwrap(), WebhookOutcome::Duplicate);

        let stored = fx.accounts.find_by_id(&fx.account.id).await.unwrap().unwrap();
        assert_eq!(stored.tier, SubscriptionTier::Pro);
        assert_eq!(stored.stripe_customer_id.as_deref(), Some("cus_123"));
        assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_123"));
    }

    #[tokio::test]
    async fn deleted_subscription_downgrades_by_customer() {
        let fx = fixture().await;
        fx.handler
            .handle(signed(checkout_completed("evt_1", &fx.account.id)))
            .await
            .unwrap();

        fx.handler
            .handle(signed(json!({
                "id": "evt_2",
                "type": "customer.subscription.deleted",
                "created": 1_700_000_100,
                "data": {"object": {"id": "sub_123", "customer": "cus_123", "status": "canceled"}}
            })))
            .await
            .unwrap();

        assert_eq!(tier_of(&fx).await, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn tampered_payload_is_rejected() {
        let fx = fixture().await;
        let mut cmd = signed(checkout_completed("evt_1", &fx.account.id));
        cmd.payload.extend_from_slice(b" ");

        let err = fx.handler.handle(cmd).await.unwrap_err();
        assert!(err.is_authentication_failure());
        assert_eq!(tier_of(&fx).await, SubscriptionTier::Free);
    }

    #[tokio::test]
    async fn unknown_customer_is_retryable() {
        let fx = fixture().await;
        let err = fx
            .handler
            .handle(signed(json!({
                "id": "evt_3",
                "type": "customer.subscription.deleted",
                "created": 1_700_000_100,
                "data": {"object": {"id": "sub_9", "customer": "cus_unknown", "status": "canceled"}}
            })))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unhandled_types_are_recorded_as_ignored() {
        let fx = fixture().await;
        let cmd = signed(json!({
            "id": "evt_4",
            "type": "customer.created",
            "created": 1_700_000_100,
            "data": {"object": {}}
        }));

        assert!(matches!(
            fx.handler.handle(cmd.clone()).await.unwrap(),
            WebhookOutcome::Ignored { .. }
        ));
        assert_eq!(fx.handler.handle(cmd).await.unwrap(), WebhookOutcome::Duplicate);
    }
}
