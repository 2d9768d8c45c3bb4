//! Rate limiting port for protecting the API and the AI budget.
//!
//! Callers pass the quota with each check, so one limiter instance serves
//! the global, per-IP and per-user limits as well as per-tier resource
//! quotas such as daily AI generations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, UserId};

/// Port for rate limiting operations.
///
/// The algorithm is a fixed-window counter. Implementations should be
/// thread-safe; an off-by-one permissive window under races is acceptable.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check if request is allowed, consuming one unit of quota if so.
    async fn check(&self, key: &RateLimitKey, quota: Quota) -> Result<RateLimitResult, RateLimitError>;

    /// Get current status without consuming quota.
    async fn status(&self, key: &RateLimitKey, quota: Quota) -> Result<RateLimitStatus, RateLimitError>;

    /// Clears the current window for a key, restoring full quota.
    async fn reset(&self, key: &RateLimitKey) -> Result<(), RateLimitError>;
}

/// How many requests fit in one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    pub limit: u32,
    pub window_secs: u32,
}

impl Quota {
    pub const fn new(limit: u32, window_secs: u32) -> Self {
        Self { limit, window_secs }
    }

    pub const fn per_minute(limit: u32) -> Self {
        Self::new(limit, 60)
    }

    pub const fn per_day(limit: u32) -> Self {
        Self::new(limit, 86_400)
    }
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub scope: RateLimitScope,
    /// Identifier within the scope (IP address or user ID).
    pub identifier: String,
    /// Optional resource for finer-grained limits (e.g. "ai_generation").
    pub resource: Option<String>,
}

/// The scope at which rate limiting is applied.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitScope {
    Global,
    Ip,
    User,
}

impl RateLimitKey {
    pub fn global() -> Self {
        Self {
            scope: RateLimitScope::Global,
            identifier: "global".to_string(),
            resource: None,
        }
    }

    pub fn ip(ip: &str) -> Self {
        Self {
            scope: RateLimitScope::Ip,
            identifier: ip.to_string(),
            resource: None,
        }
    }

    pub fn user(user_id: &UserId) -> Self {
        Self {
            scope: RateLimitScope::User,
            identifier: user_id.to_string(),
            resource: None,
        }
    }

    /// A per-user key for one metered resource.
    pub fn user_resource(user_id: &UserId, resource: &str) -> Self {
        Self {
            scope: RateLimitScope::User,
            identifier: user_id.to_string(),
            resource: Some(resource.to_string()),
        }
    }

    /// Flat key used by storage backends: `global`, `ip:<addr>`,
    /// `user:<id>` or `user:<id>:<resource>`.
    pub fn storage_key(&self) -> String {
        match (self.scope, &self.resource) {
            (RateLimitScope::Global, _) => "global".to_string(),
            (scope, Some(resource)) => {
                format!("{}:{}:{}", scope.as_str(), self.identifier, resource)
            }
            (scope, None) => format!("{}:{}", scope.as_str(), self.identifier),
        }
    }
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::Global => "global",
            RateLimitScope::Ip => "ip",
            RateLimitScope::User => "user",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current rate limit status.
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
    pub window_secs: u32,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Seconds until the client should retry.
    pub retry_after_secs: u32,
    /// When the current window resets.
    pub reset_at: Timestamp,
    /// The scope that triggered the denial.
    pub scope: RateLimitScope,
    pub message: String,
}

/// Errors that can occur during rate limiting operations.
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    /// Rate limiter backend is unavailable.
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}
