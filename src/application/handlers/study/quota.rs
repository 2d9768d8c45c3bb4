//! Daily AI generation quota, sized by subscription tier.

use std::sync::Arc;

use crate::adapters::rate_limiter::{RateLimitConfig, AI_GENERATION};
use crate::domain::billing::SubscriptionTier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{AccountRepository, RateLimitKey, RateLimitResult, RateLimiter};

pub struct GenerationQuota {
    accounts: Arc<dyn AccountRepository>,
    limiter: Arc<dyn RateLimiter>,
    limits: RateLimitConfig,
}

impl GenerationQuota {
    pub fn new(accounts: Arc<dyn AccountRepository>, limiter: Arc<dyn RateLimiter>, limits: RateLimitConfig) -> Self {
        Self {
            accounts,
            limiter,
            limits,
        }
    }

    /// Consumes one generation. Users without an account row count as free.
    ///
    /// A limiter outage lets the request through.
    pub async fn consume(&self, user_id: &UserId) -> Result<(), DomainError> {
        let tier = self
            .accounts
            .find_by_id(user_id)
            .await?
            .map(|a| a.tier)
            .unwrap_or(SubscriptionTier::Free);

        let key = RateLimitKey::user_resource(user_id, AI_GENERATION);
        match self.limiter.check(&key, self.limits.ai_generation_quota(tier)).await {
            Ok(RateLimitResult::Allowed(_)) => Ok(()),
            Ok(RateLimitResult::Denied(denied)) => {
                tracing::info!(user_id = %user_id, tier = %tier, "AI generation quota exhausted");
                Err(DomainError::new(
                    ErrorCode::RateLimited,
                    format!("Daily limit of {} AI generations reached", denied.limit),
                )
                .with_detail("retry_after_secs", denied.retry_after_secs.to_string()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rate limiter unavailable, allowing generation");
                Ok(())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::quota_with_daily_limit;
    use super::*;

    #[tokio::test]
    async fn free_users_are_cut_off_at_the_daily_limit() {
        let quota = quota_with_daily_limit(2);
        let user = UserId::new("u1").unwrap();

        quota.consume(&user).await.unwrap();
        quota.consume(&user).await.unwrap();
        let err = quota.consume(&user).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::RateLimited);
        assert!(err.details.contains_key("retry_after_secs"));
        quota.consume(&UserId::new("u2").unwrap()).await.unwrap();
    }
}
