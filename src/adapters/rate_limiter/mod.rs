//! Rate limiter adapters.
//!
//! ## Usage
//!
//! ```ignore
//! use brain_battle::adapters::rate_limiter::{InMemoryRateLimiter, RateLimitConfig};
//!
//! let limiter = InMemoryRateLimiter::new();
//! let quota = config.ai_generation_quota(account.tier);
//! limiter.check(&RateLimitKey::user_resource(&user_id, AI_GENERATION), quota).await?;
//! ```

mod config;
mod in_memory;

pub use config::{GlobalLimits, IpLimits, RateLimitConfig, TierRateLimits, AI_GENERATION};
pub use in_memory::InMemoryRateLimiter;
