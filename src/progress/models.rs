//! Progress data models
//!
//! `UserProgress` is the in-memory form. `UserDocument` is what gets written
//! to the `"user"` namespace of the persistence backend.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{ProgressKey, ScoreSubmission, UnlockState};

/// How many recent runs are kept per key
pub const RECENT_RUNS: usize = 20;

/// One recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub value: f64,
    #[serde(default)]
    pub perfect: bool,
    pub timestamp: DateTime<Utc>,
}

/// Score history for one key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistory {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub perfect_runs: u32,
    /// Lowest value seen
    #[serde(default)]
    pub best: Option<f64>,
    #[serde(default)]
    pub last: Option<ScoreRecord>,
    /// Most recent runs, oldest first
    #[serde(default)]
    pub recent: Vec<ScoreRecord>,
}

impl ScoreHistory {
    pub fn record(&mut self, submission: &ScoreSubmission) {
        let record = ScoreRecord {
            value: submission.value,
            perfect: submission.perfect,
            timestamp: submission.timestamp,
        };

        self.attempts = self.attempts.saturating_add(1);
        if submission.perfect {
            self.perfect_runs = self.perfect_runs.saturating_add(1);
        }
        self.best = Some(match self.best {
            Some(best) => best.min(submission.value),
            None => submission.value,
        });

        self.recent.push(record.clone());
        if self.recent.len() > RECENT_RUNS {
            let excess = self.recent.len() - RECENT_RUNS;
            self.recent.drain(..excess);
        }
        self.last = Some(record);
    }
}

/// Stored progress for one key
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressEntry {
    /// Thresholds of the definition the flags were computed against
    pub thresholds: Vec<f64>,
    pub state: UnlockState,
    pub history: ScoreHistory,
}

/// In-memory progress of the current user
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserProgress {
    pub catalog_version: u32,
    pub entries: BTreeMap<ProgressKey, ProgressEntry>,
}

impl UserProgress {
    pub fn get(&self, key: &ProgressKey) -> Option<&ProgressEntry> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_document(doc: UserDocument) -> Self {
        let mut entries = BTreeMap::new();

        for (game_id, achievements) in doc.achievements {
            for stored in achievements {
                let key = ProgressKey::new(&game_id, &stored.variant_key);
                entries.insert(
                    key,
                    ProgressEntry {
                        thresholds: stored.thresholds,
                        state: UnlockState {
                            unlocked: stored.unlocked,
                        },
                        history: ScoreHistory::default(),
                    },
                );
            }
        }

        for (game_id, variants) in doc.score_history {
            for (variant_key, history) in variants {
                let key = ProgressKey::new(&game_id, &variant_key);
                // History without an achievement slot is picked up by sync
                // only if the key is still in the catalog.
                entries.entry(key).or_default().history = history;
            }
        }

        Self {
            catalog_version: doc.catalog_version,
            entries,
        }
    }

    pub fn to_document(&self) -> UserDocument {
        let mut doc = UserDocument {
            catalog_version: self.catalog_version,
            ..Default::default()
        };

        for (key, entry) in &self.entries {
            doc.achievements
                .entry(key.game_id.clone())
                .or_default()
                .push(StoredAchievement {
                    variant_key: key.variant_key.clone(),
                    thresholds: entry.thresholds.clone(),
                    unlocked: entry.state.unlocked.clone(),
                });

            if entry.history.attempts > 0 {
                doc.score_history
                    .entry(key.game_id.clone())
                    .or_default()
                    .insert(key.variant_key.clone(), entry.history.clone());
            }
        }

        doc
    }
}

/// Persisted achievement slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAchievement {
    pub variant_key: String,
    #[serde(default)]
    pub thresholds: Vec<f64>,
    #[serde(default)]
    pub unlocked: Vec<bool>,
}

/// Document stored under the `"user"` namespace
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub catalog_version: u32,
    #[serde(default)]
    pub achievements: BTreeMap<String, Vec<StoredAchievement>>,
    #[serde(default)]
    pub score_history: BTreeMap<String, BTreeMap<String, ScoreHistory>>,
}

/// Unlocked/total tiers for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: String,
    pub unlocked: usize,
    pub total: usize,
}

/// Overview used by status screens
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub games: Vec<GameSummary>,
    pub unlocked: usize,
    pub total: usize,
}

impl ProgressSummary {
    /// Fraction of all tiers unlocked (0.0 - 1.0)
    pub fn completion(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.unlocked as f32 / self.total as f32
        }
    }
}

/// What a sync pass changed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub added: Vec<ProgressKey>,
    pub pruned: Vec<ProgressKey>,
    pub resized: Vec<ProgressKey>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.pruned.is_empty() && self.resized.is_empty()
    }
}
