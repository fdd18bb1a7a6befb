//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

/// Unlock notification behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Time each notification stays visible, in milliseconds
    #[serde(default = "default_dwell_ms")]
    pub dwell_ms: u64,

    /// Play a sound when a notification appears
    #[serde(default = "default_sound")]
    pub sound: bool,

    /// Cap on waiting notifications; the oldest are dropped beyond it.
    /// Unbounded when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pending: Option<usize>,
}

/// Where progress is stored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database path (default: ~/.mindgym/progress.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Achievement catalog source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog TOML to use instead of the bundled one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_dwell_ms() -> u64 {
    3000
}

fn default_sound() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            dwell_ms: default_dwell_ms(),
            sound: default_sound(),
            max_pending: None,
        }
    }
}
