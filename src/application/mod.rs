//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate domain operations over ports. Each owns its
//! dependencies as `Arc<dyn Port>` and exposes a single `handle`.

pub mod handlers;
