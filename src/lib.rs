//! Brain Battle - multiplayer quiz and study backend.
//!
//! Players compete in real-time quiz rooms, run recurring sessions inside
//! clans, and generate study notes and quizzes with an LLM. Progress is
//! tracked as XP, levels, rank tiers and achievements; Stripe billing
//! unlocks higher AI generation quotas.
//!
//! The crate follows a hexagonal layout: `domain` holds the rules,
//! `ports` the interfaces, `adapters` the implementations and
//! `application` the command and query handlers that tie them together.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
