//! Achievement catalog, registry and unlock evaluation
//!
//! The registry is built once from the catalog and is read-only afterwards.
//! The evaluator is a pure function over a definition, a prior unlock state
//! and a score submission.

mod catalog;
mod definitions;
mod evaluator;
mod models;
mod registry;
mod variant;

pub use catalog::{Catalog, CatalogError, RejectedGame, BUNDLED_CATALOG_TOML};
pub use definitions::{
    AchievementDefinition, ProgressKey, Tier, TierPolicy, UnlockMode, MAX_TIERS,
};
pub use evaluator::{evaluate, evaluate_definition, Evaluation, EvaluationError};
pub use models::{NotificationEvent, ScoreSubmission, UnlockState};
pub use registry::AchievementRegistry;
pub use variant::VariantSpec;
