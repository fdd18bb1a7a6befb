//! Configuration loading and management
//!
//! The global config lives at `~/.mindgym/config.toml` and is created with
//! defaults on first use.

mod io;
mod settings;

pub use settings::{CatalogSettings, NotificationSettings, Settings, StorageSettings};

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// How long each unlock notification stays on screen
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.settings.notifications.dwell_ms)
    }

    /// Progress database path, defaulting to `~/.mindgym/progress.db`
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .storage
            .database
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }
}
