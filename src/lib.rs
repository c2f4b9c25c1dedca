//! Burnout scoring and trend-event detection for on-call teams.
//!
//! Raw per-member activity is normalized into five 0-10 risk factors
//! ([`normalize`]), combined into a member score ([`risk`]) and averaged across
//! the team ([`team`]). Daily team health is scanned for standout days to build
//! a timeline ([`trends`]). All of these are pure functions over borrowed
//! input.

pub mod adapter;
pub mod cache;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod report;
pub mod risk;
pub mod team;
pub mod telemetry;
pub mod trends;

pub use error::{Error, Result};
pub use normalize::normalize_factors;
pub use risk::aggregate_member;
pub use team::aggregate_team;
pub use trends::detect_standout_events;
