//! mindgym - achievement unlocks for brain-training games
//!
//! Games report a score for a `(game, variant)` pair. The engine compares it
//! against tiered thresholds from the achievement catalog, records newly
//! unlocked tiers durably and shows one notification per unlock.
//!
//! ## Parts
//!
//! - [`achievements`]: catalog, registry and the pure unlock evaluator
//! - [`progress`]: per-user unlock flags and score history with persistence
//! - [`notifications`]: one-at-a-time display queue for unlock events
//! - [`engine`]: wires the three together from a [`config::Config`]

pub mod achievements;
pub mod config;
pub mod engine;
pub mod notifications;
pub mod progress;

pub use engine::{Engine, StorageMode};
