//! Rate limit configuration types.
//!
//! Request limits for the global, per-IP and per-user scopes, plus the
//! per-tier quotas for metered resources.

use serde::{Deserialize, Serialize};

use crate::domain::billing::SubscriptionTier;
use crate::ports::{Quota, RateLimitScope};

/// Resource name for AI note and quiz generation.
pub const AI_GENERATION: &str = "ai_generation";

/// Complete rate limit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Disables the HTTP middleware (resource quotas still apply).
    pub enabled: bool,
    /// Global rate limits (infrastructure protection).
    pub global: GlobalLimits,
    /// Per-IP rate limits (brute-force protection).
    pub per_ip: IpLimits,
    /// Per-authenticated-user request limit.
    pub user_requests_per_minute: u32,
    pub free: TierRateLimits,
    pub pro: TierRateLimits,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalLimits {
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLimits {
    pub requests_per_minute: u32,
}

/// Quotas for one subscription tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRateLimits {
    /// Notes and quiz generations per day.
    pub ai_generations_per_day: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            global: GlobalLimits {
                requests_per_minute: 10_000,
            },
            per_ip: IpLimits {
                requests_per_minute: 100,
            },
            user_requests_per_minute: 120,
            free: TierRateLimits::free(),
            pro: TierRateLimits::pro(),
        }
    }
}

impl TierRateLimits {
    pub fn free() -> Self {
        Self {
            ai_generations_per_day: 10,
        }
    }

    pub fn pro() -> Self {
        Self {
            ai_generations_per_day: 200,
        }
    }
}

impl RateLimitConfig {
    /// Request quota for an HTTP-level scope.
    pub fn quota_for_scope(&self, scope: RateLimitScope) -> Quota {
        match scope {
            RateLimitScope::Global => Quota::per_minute(self.global.requests_per_minute),
            RateLimitScope::Ip => Quota::per_minute(self.per_ip.requests_per_minute),
            RateLimitScope::User => Quota::per_minute(self.user_requests_per_minute),
        }
    }

    pub fn limits_for_tier(&self, tier: SubscriptionTier) -> &TierRateLimits {
        match tier {
            SubscriptionTier::Free => &self.free,
            SubscriptionTier::Pro => &self.pro,
        }
    }

    /// Daily AI generation quota for a tier.
    pub fn ai_generation_quota(&self, tier: SubscriptionTier) -> Quota {
        Quota::per_day(self.limits_for_tier(tier).ai_generations_per_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_global_limit_is_10000() {
        let config = RateLimitConfig::default();
        assert_eq!(
            config.quota_for_scope(RateLimitScope::Global),
            Quota::per_minute(10_000)
        );
    }

    #[test]
    fn default_ip_limit_is_100() {
        let config = RateLimitConfig::default();
        assert_eq!(config.quota_for_scope(RateLimitScope::Ip).limit, 100);
    }

    #[test]
    fn pro_tier_generates_more_than_free() {
        let config = RateLimitConfig::default();
        let free = config.ai_generation_quota(SubscriptionTier::Free);
        let pro = config.ai_generation_quota(SubscriptionTier::Pro);
        assert!(pro.limit > free.limit);
        assert_eq!(free.window_secs, 86_400);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: RateLimitConfig =
            serde_json::from_str(r#"{"user_requests_per_minute": 7}"#).unwrap();
        assert_eq!(config.user_requests_per_minute, 7);
        assert_eq!(config.per_ip.requests_per_minute, 100);
        assert!(config.enabled);
    }
}
