//! User progress store
//!
//! Owns the unlock flags and score history of the current user. Every
//! mutation of a key goes through [`ProgressStore::try_submit`] while holding
//! that key's lock, so a stale evaluation can never overwrite a newer unlock.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::backend::{ProgressBackend, USER_NAMESPACE};
use super::key_locks::KeyLocks;
use super::models::{
    GameSummary, ProgressEntry, ProgressSummary, ScoreHistory, SyncReport, UserDocument,
    UserProgress,
};
use super::writer::PersistWriter;
use crate::achievements::{
    evaluate_definition, AchievementRegistry, EvaluationError, NotificationEvent, ProgressKey,
    ScoreSubmission, UnlockState,
};
use crate::notifications::NotificationHandle;

/// Durable per-user progress
pub struct ProgressStore {
    registry: Arc<AchievementRegistry>,
    progress: Mutex<UserProgress>,
    locks: KeyLocks,
    writer: PersistWriter,
    notifier: Option<NotificationHandle>,
    /// Loading failed; progress stays in memory so the stored document is
    /// never replaced by a map that lacks its unlocks
    degraded: bool,
    startup_sync: SyncReport,
}

impl ProgressStore {
    /// Load progress from the backend and reconcile it with the registry.
    ///
    /// Read or decode failures leave the store with empty progress that is
    /// kept in memory only for the rest of the session.
    /// Must be called from within a tokio runtime.
    pub fn load(registry: Arc<AchievementRegistry>, backend: Arc<dyn ProgressBackend>) -> Self {
        let (progress, degraded) = match backend.read(USER_NAMESPACE) {
            Ok(Some(value)) => match serde_json::from_value::<UserDocument>(value) {
                Ok(doc) => (UserProgress::from_document(doc), false),
                Err(e) => {
                    warn!("Stored progress is unreadable, this session will not be saved: {}", e);
                    (UserProgress::default(), true)
                }
            },
            Ok(None) => {
                info!("No stored progress, starting fresh");
                (UserProgress::default(), false)
            }
            Err(e) => {
                warn!("Failed to read progress, this session will not be saved: {}", e);
                (UserProgress::default(), true)
            }
        };

        let mut store = Self {
            writer: PersistWriter::spawn(backend, USER_NAMESPACE),
            registry,
            progress: Mutex::new(progress),
            locks: KeyLocks::new(),
            notifier: None,
            degraded,
            startup_sync: SyncReport::default(),
        };
        store.startup_sync = store.sync(store.registry.version());
        store
    }

    /// What the sync run by [`ProgressStore::load`] changed
    pub fn startup_sync(&self) -> &SyncReport {
        &self.startup_sync
    }

    /// Whether loading failed and the store started from empty progress
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Forward unlock events to a notification queue
    pub fn with_notifier(mut self, notifier: NotificationHandle) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn registry(&self) -> &AchievementRegistry {
        &self.registry
    }

    fn progress(&self) -> MutexGuard<'_, UserProgress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a score and return the tiers it unlocked.
    ///
    /// Unknown keys and invalid scores are logged and yield no events.
    pub async fn submit_score(
        &self,
        game_id: &str,
        variant_key: &str,
        value: f64,
        perfect: bool,
    ) -> Vec<NotificationEvent> {
        let submission = ScoreSubmission::new(game_id, variant_key, value).perfect(perfect);
        match self.try_submit(submission).await {
            Ok(events) => events,
            Err(e @ EvaluationError::LookupMiss { .. }) => {
                debug!("Score not tracked: {}", e);
                Vec::new()
            }
            Err(e) => {
                warn!(game = game_id, variant = variant_key, "Score rejected: {}", e);
                Vec::new()
            }
        }
    }

    /// Record a score, reporting why nothing changed
    pub async fn try_submit(
        &self,
        submission: ScoreSubmission,
    ) -> Result<Vec<NotificationEvent>, EvaluationError> {
        let key = submission.key();
        let definition = self.registry.get(&key).ok_or_else(|| EvaluationError::LookupMiss {
            game_id: submission.game_id.clone(),
            variant_key: submission.variant_key.clone(),
        })?;

        let _guard = self.locks.acquire(&key).await;

        let prior = self
            .progress()
            .get(&key)
            .map(|entry| entry.state.clone())
            .unwrap_or_else(|| UnlockState::locked(definition.tier_count()));

        let evaluation = evaluate_definition(definition, &prior, &submission)?;

        {
            let mut progress = self.progress();
            let entry = progress.entries.entry(key.clone()).or_default();
            entry.thresholds = definition.thresholds.clone();
            entry.state = evaluation.next_state;
            entry.history.record(&submission);
            // Snapshot while still holding the lock so writes land in order
            self.persist(&progress);
        }

        if !evaluation.new_events.is_empty() {
            info!(
                key = %key,
                unlocked = evaluation.new_events.len(),
                "Achievement tiers unlocked"
            );
            if let Some(notifier) = &self.notifier {
                notifier.enqueue(evaluation.new_events.clone());
            }
        }

        Ok(evaluation.new_events)
    }

    /// Reconcile stored keys with the registry.
    ///
    /// Keys missing from storage start all-locked, keys no longer in the
    /// registry are pruned and states whose tier count changed are resized.
    /// Running it twice changes nothing the second time.
    pub fn sync(&self, catalog_version: u32) -> SyncReport {
        let mut report = SyncReport::default();
        let mut progress = self.progress();

        let stale: Vec<ProgressKey> = progress
            .entries
            .keys()
            .filter(|key| !self.registry.contains(key))
            .cloned()
            .collect();
        for key in stale {
            progress.entries.remove(&key);
            report.pruned.push(key);
        }

        for definition in self.registry.definitions() {
            let key = definition.key();
            let tiers = definition.tier_count();

            match progress.entries.get_mut(&key) {
                None => {
                    progress.entries.insert(
                        key.clone(),
                        ProgressEntry {
                            thresholds: definition.thresholds.clone(),
                            state: UnlockState::locked(tiers),
                            history: ScoreHistory::default(),
                        },
                    );
                    report.added.push(key);
                }
                // Score history without a stored achievement slot
                Some(entry) if entry.state.unlocked.is_empty() => {
                    entry.state = UnlockState::locked(tiers);
                    entry.thresholds = definition.thresholds.clone();
                    report.added.push(key);
                }
                Some(entry) => {
                    if entry.state.unlocked.len() != tiers {
                        entry.state = entry.state.resized(tiers);
                        report.resized.push(key);
                    }
                    entry.thresholds = definition.thresholds.clone();
                }
            }
        }

        let version_changed = progress.catalog_version != catalog_version;
        progress.catalog_version = catalog_version;

        if !report.is_empty() || version_changed {
            info!(
                catalog_version,
                added = report.added.len(),
                pruned = report.pruned.len(),
                resized = report.resized.len(),
                "Progress synced with catalog"
            );
            self.persist(&progress);
        }

        report
    }

    fn persist(&self, progress: &UserProgress) {
        if self.degraded {
            debug!("Progress kept in memory only after failed load");
            return;
        }
        match serde_json::to_value(progress.to_document()) {
            Ok(document) => self.writer.submit(document),
            Err(e) => warn!("Failed to encode progress: {}", e),
        }
    }

    /// Wait for pending writes. Call before shutdown.
    pub async fn flush(&self) -> bool {
        self.writer.flush().await
    }

    pub fn unlock_state(&self, game_id: &str, variant_key: &str) -> Option<UnlockState> {
        self.progress()
            .get(&ProgressKey::new(game_id, variant_key))
            .map(|entry| entry.state.clone())
    }

    pub fn history(&self, game_id: &str, variant_key: &str) -> Option<ScoreHistory> {
        self.progress()
            .get(&ProgressKey::new(game_id, variant_key))
            .map(|entry| entry.history.clone())
    }

    /// Copy of the whole progress map
    pub fn snapshot(&self) -> UserProgress {
        self.progress().clone()
    }

    /// Unlocked/total tiers per game
    pub fn summary(&self) -> ProgressSummary {
        let progress = self.progress();
        let mut summary = ProgressSummary::default();

        for definition in self.registry.definitions() {
            let unlocked = progress
                .get(&definition.key())
                .map(|entry| entry.state.unlocked_count())
                .unwrap_or(0);
            let total = definition.tier_count();

            match summary.games.last_mut() {
                Some(game) if game.game_id == definition.game_id => {
                    game.unlocked += unlocked;
                    game.total += total;
                }
                _ => summary.games.push(GameSummary {
                    game_id: definition.game_id.clone(),
                    unlocked,
                    total,
                }),
            }
            summary.unlocked += unlocked;
            summary.total += total;
        }

        summary
    }
}
