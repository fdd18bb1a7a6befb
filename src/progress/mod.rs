//! User progress tracking
//!
//! Stores unlock flags and score history per `(game, variant)` key and
//! persists them as a JSON document through a [`ProgressBackend`]
//! (SQLite at `~/.mindgym/progress.db` by default).
//!
//! # Usage
//!
//! ```ignore
//! let registry = Arc::new(AchievementRegistry::bundled());
//! let backend = Arc::new(SqliteBackend::open(&config.database_path())?);
//! let store = ProgressStore::load(registry, backend);
//!
//! let unlocked = store.submit_score("schulte", "5x5", 38.2, false).await;
//! store.flush().await;
//! ```

mod backend;
mod db;
mod key_locks;
mod models;
mod store;
mod writer;

pub use backend::{BackendError, MemoryBackend, ProgressBackend, SETTINGS_NAMESPACE, USER_NAMESPACE};
pub use db::SqliteBackend;
pub use key_locks::KeyLocks;
pub use models::{
    GameSummary, ProgressEntry, ProgressSummary, ScoreHistory, ScoreRecord, StoredAchievement,
    SyncReport, UserDocument, UserProgress, RECENT_RUNS,
};
pub use store::ProgressStore;
pub use writer::PersistWriter;
