//! In-memory rate limiter.
//!
//! Fixed-window counters in a HashMap. Counters live in one process only,
//! which is the deployment model this service targets.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    Quota, RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitStatus,
    RateLimiter,
};

/// In-memory fixed-window rate limiter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimiter {
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

/// State for a single rate limit window.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    /// Unix seconds.
    window_start: u64,
    window_secs: u32,
}

impl WindowState {
    fn window_end(&self) -> u64 {
        self.window_start + u64::from(self.window_secs)
    }
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops windows that have already ended. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        self.prune_at(Timestamp::now().as_unix_secs()).await
    }

    async fn prune_at(&self, now: u64) -> usize {
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, state| now < state.window_end());
        before - windows.len()
    }

    /// Number of tracked keys.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    async fn check_at(&self, key: &RateLimitKey, quota: Quota, now: u64) -> RateLimitResult {
        let mut windows = self.windows.write().await;

        let state = windows.entry(key.storage_key()).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
            window_secs: quota.window_secs,
        });

        if now >= state.window_end() {
            state.count = 0;
            state.window_start = now;
            state.window_secs = quota.window_secs;
        }

        let reset_at = Timestamp::from_unix_secs(state.window_end());

        if state.count >= quota.limit {
            let retry_after = state.window_end().saturating_sub(now) as u32;
            return RateLimitResult::Denied(RateLimitDenied {
                limit: quota.limit,
                retry_after_secs: retry_after.max(1),
                reset_at,
                scope: key.scope,
                message: format!(
                    "Rate limit exceeded for {}. Retry after {} seconds.",
                    key.scope,
                    retry_after.max(1)
                ),
            });
        }

        state.count += 1;
        RateLimitResult::Allowed(RateLimitStatus {
            limit: quota.limit,
            remaining: quota.limit.saturating_sub(state.count),
            reset_at,
            window_secs: quota.window_secs,
        })
    }

    async fn status_at(&self, key: &RateLimitKey, quota: Quota, now: u64) -> RateLimitStatus {
        let windows = self.windows.read().await;

        let (count, window_start) = windows
            .get(&key.storage_key())
            .filter(|state| now < state.window_end())
            .map(|state| (state.count, state.window_start))
            .unwrap_or((0, now));

        RateLimitStatus {
            limit: quota.limit,
            remaining: quota.limit.saturating_sub(count),
            reset_at: Timestamp::from_unix_secs(window_start + u64::from(quota.window_secs)),
            window_secs: quota.window_secs,
        }
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &RateLimitKey, quota: Quota) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, quota, Timestamp::now().as_unix_secs()).await)
    }

    async fn status(&self, key: &RateLimitKey, quota: Quota) -> Result<RateLimitStatus, RateLimitError> {
        Ok(self.status_at(key, quota, Timestamp::now().as_unix_secs()).await)
    }

    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError> {
        self.windows.write().await.remove(&key.storage_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::ports::RateLimitScope;

    const T0: u64 = 1_700_000_000;

    // ─── Basic Functionality Tests ───────────────────────────────────

    #[tokio::test]
    async fn allows_requests_within_limit() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::ip("192.168.1.1");

        for i in 0..10 {
            let result = limiter.check(&key, Quota::per_minute(100)).await.unwrap();
            assert!(result.is_allowed(), "Request {} should be allowed", i + 1);
        }
    }

    #[tokio::test]
    async fn denies_requests_at_limit() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::ip("192.168.1.1");
        let quota = Quota::per_minute(5);

        for _ in 0..5 {
            assert!(limiter.check_at(&key, quota, T0).await.is_allowed());
        }

        match limiter.check_at(&key, quota, T0 + 10).await {
            RateLimitResult::Denied(denied) => {
                assert_eq!(denied.limit, 5);
                assert_eq!(denied.retry_after_secs, 50);
                assert_eq!(denied.scope, RateLimitScope::Ip);
            }
            other => panic!("expected denial, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn window_resets_once_interval_elapses() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::global();
        let quota = Quota::per_minute(2);

        assert!(limiter.check_at(&key, quota, T0).await.is_allowed());
        assert!(limiter.check_at(&key, quota, T0 + 1).await.is_allowed());
        assert!(limiter.check_at(&key, quota, T0 + 59).await.is_denied());

        match limiter.check_at(&key, quota, T0 + 60).await {
            RateLimitResult::Allowed(status) => {
                assert_eq!(status.remaining, 1);
                assert_eq!(status.reset_at.as_unix_secs(), T0 + 120);
            }
            other => panic!("expected allowance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn remaining_decrements_correctly() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::ip("test-ip");
        let quota = Quota::per_minute(10);

        for expected_remaining in (0..10u32).rev() {
            match limiter.check_at(&key, quota, T0).await {
                RateLimitResult::Allowed(status) => assert_eq!(status.remaining, expected_remaining),
                other => panic!("expected allowance, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn status_does_not_consume() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::ip("10.0.0.1");
        let quota = Quota::per_minute(10);

        assert_eq!(limiter.status_at(&key, quota, T0).await.remaining, 10);
        for _ in 0..3 {
            limiter.check_at(&key, quota, T0).await;
        }
        assert_eq!(limiter.status_at(&key, quota, T0 + 1).await.remaining, 7);
        assert_eq!(limiter.status_at(&key, quota, T0 + 1).await.remaining, 7);
        assert_eq!(limiter.status_at(&key, quota, T0 + 60).await.remaining, 10);
    }

    #[tokio::test]
    async fn reset_clears_counter() {
        let limiter = InMemoryRateLimiter::new();
        let key = RateLimitKey::ip("10.0.0.2");
        let quota = Quota::per_minute(1);

        assert!(limiter.check(&key, quota).await.unwrap().is_allowed());
        assert!(limiter.check(&key, quota).await.unwrap().is_denied());

        limiter.reset(&key).await.unwrap();
        assert!(limiter.check(&key, quota).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = InMemoryRateLimiter::new();
        let quota = Quota::per_minute(1);
        let user = UserId::new("user-1").unwrap();

        assert!(limiter.check_at(&RateLimitKey::ip("1.1.1.1"), quota, T0).await.is_allowed());
        assert!(limiter.check_at(&RateLimitKey::ip("1.1.1.1"), quota, T0).await.is_denied());
        assert!(limiter.check_at(&RateLimitKey::ip("2.2.2.2"), quota, T0).await.is_allowed());
        assert!(limiter.check_at(&RateLimitKey::user(&user), quota, T0).await.is_allowed());
        assert!(limiter
            .check_at(&RateLimitKey::user_resource(&user, "ai_generation"), quota, T0)
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn prune_drops_only_expired_windows() {
        let limiter = InMemoryRateLimiter::new();
        limiter.check_at(&RateLimitKey::ip("a"), Quota::per_minute(5), T0).await;
        limiter.check_at(&RateLimitKey::ip("b"), Quota::per_day(5), T0).await;

        assert_eq!(limiter.prune_at(T0 + 30).await, 0);
        assert_eq!(limiter.prune_at(T0 + 61).await, 1);
        assert_eq!(limiter.tracked_keys().await, 1);
    }
}
