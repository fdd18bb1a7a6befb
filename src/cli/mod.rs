//! CLI command implementations

pub mod catalog;
pub mod init;
pub mod status;
pub mod submit;
pub mod sync;

use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use mindgym::config::Config;
use mindgym::{Engine, StorageMode};

/// Global options shared by all commands
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub ephemeral: bool,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, ephemeral: bool) -> Self {
        Self {
            config_path,
            ephemeral,
        }
    }

    /// Explicit `--config`, or the global config (created on first use)
    pub fn config(&self) -> Result<Config> {
        Config::resolve(self.config_path.as_deref())
    }

    pub fn storage(&self) -> StorageMode {
        if self.ephemeral {
            StorageMode::Ephemeral
        } else {
            StorageMode::Database
        }
    }

    pub fn engine(&self) -> Result<Engine> {
        let config = self.config()?;
        Engine::open(&config, self.storage())
    }
}

/// End a command's engine session.
///
/// A save that still fails after its retry is a warning only: the run was
/// recorded in memory and the next successful write stores it.
pub async fn finish_session(engine: Engine, wait_for_notifications: bool) -> Result<()> {
    let saved = if wait_for_notifications {
        engine.shutdown().await
    } else {
        engine.shutdown_now().await
    };
    if !saved {
        warn!("Progress could not be saved, changes from this run may be lost");
        eprintln!("Warning: progress could not be saved.");
    }
    Ok(())
}

/// Format a score value the way games report it
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
