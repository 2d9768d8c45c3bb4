//! Application handlers, grouped by feature.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod auth;
pub mod billing;
pub mod clans;
pub mod progress;
pub mod quiz;
pub mod rooms;
pub mod study;
