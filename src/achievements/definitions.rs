//! Achievement definitions and metadata
//!
//! A definition describes the tiers one `(game, variant)` pair can unlock.
//! Definitions are built by the catalog loader and never change afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::variant::VariantSpec;

/// Maximum number of tiers a single definition may carry
pub const MAX_TIERS: usize = 3;

/// Identifies the progress slot of one game configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressKey {
    pub game_id: String,
    pub variant_key: String,
}

impl ProgressKey {
    pub fn new(game_id: impl Into<String>, variant_key: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            variant_key: variant_key.into(),
        }
    }
}

impl fmt::Display for ProgressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.game_id, self.variant_key)
    }
}

/// How a submission is compared against the tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnlockMode {
    /// Lower values are better; a tier unlocks when `value <= threshold`
    TimeAscending,
    /// One tier, unlocked by a perfect run
    BinaryPerfect,
}

impl UnlockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeAscending => "time-ascending",
            Self::BinaryPerfect => "binary-perfect",
        }
    }
}

/// Whether qualifying for a stricter tier also unlocks the looser ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TierPolicy {
    /// Every qualifying tier unlocks in the same call
    #[default]
    Cascade,
    /// Only the strictest qualifying tier unlocks per submission
    StrictestOnly,
}

/// Display rank of a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Perfect,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Perfect => "Perfect",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Bronze => "🥉",
            Self::Silver => "🥈",
            Self::Gold => "🥇",
            Self::Perfect => "💎",
        }
    }
}

/// Immutable description of the tiers for one `(game, variant)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct AchievementDefinition {
    pub game_id: String,
    pub variant_key: String,
    pub variant: VariantSpec,
    /// Ordered loosest to strictest. Empty for `BinaryPerfect`.
    pub thresholds: Vec<f64>,
    pub mode: UnlockMode,
    pub policy: TierPolicy,
}

impl AchievementDefinition {
    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(&self.game_id, &self.variant_key)
    }

    /// Number of unlockable tiers
    pub fn tier_count(&self) -> usize {
        match self.mode {
            UnlockMode::TimeAscending => self.thresholds.len(),
            UnlockMode::BinaryPerfect => 1,
        }
    }

    /// Display rank for a tier index. The loosest tier is bronze and the
    /// strictest of two or more is gold.
    pub fn tier(&self, index: usize) -> Tier {
        if self.mode == UnlockMode::BinaryPerfect {
            return Tier::Perfect;
        }
        let strictest = self.tier_count().saturating_sub(1);
        match index {
            0 => Tier::Bronze,
            i if i >= strictest => Tier::Gold,
            _ => Tier::Silver,
        }
    }

    /// Threshold of a tier, if the definition is numeric
    pub fn threshold(&self, index: usize) -> Option<f64> {
        match self.mode {
            UnlockMode::TimeAscending => self.thresholds.get(index).copied(),
            UnlockMode::BinaryPerfect => None,
        }
    }
}
