//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, share codes, errors, auth)
//! - `account` - User records for local and third-party sign-in
//! - `billing` - Subscription tiers and Stripe webhook semantics
//! - `room` - Multiplayer lobbies
//! - `clan` - Persistent study groups
//! - `quiz` - Questions, quiz sessions, scoring, ranking and deduplication
//! - `progression` - XP, rank tiers, player stats and achievements
//! - `study` - Prompt templates and completion parsing for AI generation
//! - `document` - Text extraction from uploaded study material

#[macro_use]
mod macros;

pub mod account;
pub mod billing;
pub mod clan;
pub mod document;
pub mod foundation;
pub mod progression;
pub mod quiz;
pub mod room;
pub mod study;
