//! Unlock state, score submissions and unlock events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::definitions::{AchievementDefinition, ProgressKey, Tier};

/// Per-key unlock flags, one per tier.
///
/// Flags only ever go from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnlockState {
    pub unlocked: Vec<bool>,
}

impl UnlockState {
    /// All tiers locked
    pub fn locked(tiers: usize) -> Self {
        Self {
            unlocked: vec![false; tiers],
        }
    }

    /// Same flags, resized to `tiers` entries (new tiers start locked)
    pub fn resized(&self, tiers: usize) -> Self {
        let mut unlocked = self.unlocked.clone();
        unlocked.resize(tiers, false);
        Self { unlocked }
    }

    pub fn is_unlocked(&self, index: usize) -> bool {
        self.unlocked.get(index).copied().unwrap_or(false)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.iter().filter(|u| **u).count()
    }

    pub fn is_complete(&self) -> bool {
        self.unlocked.iter().all(|u| *u)
    }
}

/// One finished game run
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSubmission {
    pub game_id: String,
    pub variant_key: String,
    /// Lower is better for timed games; must be finite and non-negative
    pub value: f64,
    pub perfect: bool,
    pub timestamp: DateTime<Utc>,
}

impl ScoreSubmission {
    pub fn new(game_id: impl Into<String>, variant_key: impl Into<String>, value: f64) -> Self {
        Self {
            game_id: game_id.into(),
            variant_key: variant_key.into(),
            value,
            perfect: false,
            timestamp: Utc::now(),
        }
    }

    pub fn perfect(mut self, perfect: bool) -> Self {
        self.perfect = perfect;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(&self.game_id, &self.variant_key)
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

/// A tier that was just unlocked, waiting to be shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: Uuid,
    pub game_id: String,
    pub variant_key: String,
    pub tier_index: usize,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Build the event for one unlocked tier.
    ///
    /// The id is derived from the key, tier and submission time, so the same
    /// inputs always produce the same event.
    pub fn for_unlock(
        definition: &AchievementDefinition,
        tier_index: usize,
        created_at: DateTime<Utc>,
    ) -> Self {
        let name = format!(
            "{}/{}/{}/{}",
            definition.game_id,
            definition.variant_key,
            tier_index,
            created_at.timestamp_nanos_opt().unwrap_or_else(|| created_at.timestamp_millis()),
        );

        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            game_id: definition.game_id.clone(),
            variant_key: definition.variant_key.clone(),
            tier_index,
            tier: definition.tier(tier_index),
            created_at,
        }
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(&self.game_id, &self.variant_key)
    }

    /// Short human readable title
    pub fn title(&self) -> String {
        format!(
            "{} {} · {} {}",
            self.tier.icon(),
            self.tier.label(),
            self.game_id,
            self.variant_key
        )
    }
}
