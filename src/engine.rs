//! Wiring of registry, progress store and notification queue
//!
//! # Usage
//!
//! ```ignore
//! let config = Config::load()?;
//! let engine = Engine::open(&config, StorageMode::Database)?;
//!
//! engine.submit_score("schulte", "5x5", 24.1, false).await;
//! engine.shutdown().await;
//! ```

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::achievements::{AchievementRegistry, NotificationEvent};
use crate::config::Config;
use crate::notifications::{NotificationHandle, NotificationQueue, NotificationSink, TerminalSink};
use crate::progress::{MemoryBackend, ProgressBackend, ProgressStore, SqliteBackend};

/// Where the engine keeps progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// SQLite database from the config (default `~/.mindgym/progress.db`)
    Database,
    /// In-memory only, nothing survives the process
    Ephemeral,
}

/// Central handle for score submission and unlock notifications
pub struct Engine {
    store: Arc<ProgressStore>,
    notifications: NotificationHandle,
    queue_task: JoinHandle<()>,
}

impl Engine {
    /// Build an engine from config, showing notifications in the terminal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(config: &Config, storage: StorageMode) -> Result<Self> {
        let backend: Arc<dyn ProgressBackend> = match storage {
            StorageMode::Database => Arc::new(SqliteBackend::open(&config.database_path())?),
            StorageMode::Ephemeral => Arc::new(MemoryBackend::new()),
        };
        let sink = Arc::new(TerminalSink::new(config.settings.notifications.sound));
        Ok(Self::with_parts(config, backend, sink))
    }

    /// Build an engine from explicit parts
    pub fn with_parts(
        config: &Config,
        backend: Arc<dyn ProgressBackend>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let registry = Arc::new(AchievementRegistry::load(
            config.settings.catalog.path.as_deref(),
        ));

        let mut queue = NotificationQueue::new(sink, config.dwell());
        if let Some(max) = config.settings.notifications.max_pending {
            queue = queue.with_max_pending(max);
        }
        let (notifications, queue_task) = NotificationHandle::spawn(queue);

        let store = ProgressStore::load(registry, backend).with_notifier(notifications.clone());
        info!(
            definitions = store.registry().len(),
            catalog_version = store.registry().version(),
            "Achievement engine ready"
        );

        Self {
            store: Arc::new(store),
            notifications,
            queue_task,
        }
    }

    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    pub fn registry(&self) -> &AchievementRegistry {
        self.store.registry()
    }

    pub fn notifications(&self) -> &NotificationHandle {
        &self.notifications
    }

    /// Record a score; unlocks are queued for display and returned
    pub async fn submit_score(
        &self,
        game_id: &str,
        variant_key: &str,
        value: f64,
        perfect: bool,
    ) -> Vec<NotificationEvent> {
        self.store
            .submit_score(game_id, variant_key, value, perfect)
            .await
    }

    /// Let queued notifications finish, then flush pending writes.
    ///
    /// Returns whether the last write reached the backend.
    pub async fn shutdown(self) -> bool {
        self.notifications.wait_idle().await;
        let flushed = self.store.flush().await;
        self.queue_task.abort();
        debug!("Achievement engine stopped");
        flushed
    }

    /// Flush pending writes without waiting for notifications
    pub async fn shutdown_now(self) -> bool {
        let flushed = self.store.flush().await;
        self.queue_task.abort();
        flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::RecordingSink;
    use crate::progress::USER_NAMESPACE;

    #[tokio::test(start_paused = true)]
    async fn test_submit_shows_and_persists() {
        let backend = Arc::new(MemoryBackend::new());
        let sink = Arc::new(RecordingSink::new());
        let engine = Engine::with_parts(&Config::default(), backend.clone(), sink.clone());

        let events = engine.submit_score("digits", "4x4-20", 140.0, false).await;
        assert_eq!(events.len(), 2);

        assert!(engine.shutdown().await);
        assert_eq!(sink.shown(), events);
        let doc = backend.document(USER_NAMESPACE).unwrap();
        assert_eq!(
            doc["achievements"]["digits"][2]["unlocked"],
            serde_json::json!([true, true])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_pending_from_config() {
        let mut config = Config::default();
        config.settings.notifications.max_pending = Some(0);
        let sink = Arc::new(RecordingSink::new());
        let engine = Engine::with_parts(&config, Arc::new(MemoryBackend::new()), sink.clone());

        let events = engine.submit_score("schulte", "5x5", 20.0, false).await;
        assert_eq!(events.len(), 3);
        engine.notifications().wait_idle().await;

        assert_eq!(sink.shown(), events[..1].to_vec());
        assert_eq!(engine.notifications().snapshot().dropped, 2);
    }
}
