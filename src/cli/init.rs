//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use mindgym::config::Config;

/// Default configuration content for mindgym init
pub const DEFAULT_CONFIG: &str = r#"# mindgym configuration
# =====================

# ============================================================================
# NOTIFICATIONS - How unlocked achievements are shown
# ============================================================================
#
#   dwell_ms     - How long each notification stays visible (default: 3000)
#   sound        - Ring the terminal bell on unlock (default: true)
#   max_pending  - Keep at most this many waiting notifications, dropping
#                  the oldest (default: unbounded)

[settings.notifications]
dwell_ms = 3000
sound = true
# max_pending = 10

# ============================================================================
# STORAGE - Where progress is kept
# ============================================================================

[settings.storage]
# database = "/path/to/progress.db"   # default: ~/.mindgym/progress.db

# ============================================================================
# CATALOG - Achievement definitions
# ============================================================================
#
# Point at your own catalog TOML to replace the bundled one.

[settings.catalog]
# path = "/path/to/catalog.toml"
"#;

/// Write the default config file
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
