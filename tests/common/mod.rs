//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use mindgym::achievements::{AchievementRegistry, Catalog};

/// Catalog with one timed and one perfect game
pub const SMALL_CATALOG: &str = r#"
version = 1

[[game]]
id = "digits"

[[game.achievement]]
variant = "3x3-10"
thresholds = [45.0, 30.0, 20.0]

[[game.achievement]]
variant = "4x4-20"
thresholds = [200.0, 150.0]

[[game]]
id = "queens"

[[game.achievement]]
variant = "8-perfect"
"#;

/// `SMALL_CATALOG` one version later: `3x3-10` dropped, `5x5-25` added and
/// `4x4-20` gained a third tier
pub const NEXT_CATALOG: &str = r#"
version = 2

[[game]]
id = "digits"

[[game.achievement]]
variant = "4x4-20"
thresholds = [200.0, 150.0, 120.0]

[[game.achievement]]
variant = "5x5-25"
thresholds = [300.0, 240.0]

[[game]]
id = "queens"

[[game.achievement]]
variant = "8-perfect"
"#;

pub fn registry(toml: &str) -> Arc<AchievementRegistry> {
    let catalog = Catalog::parse(toml).expect("test catalog must be valid TOML");
    Arc::new(AchievementRegistry::from_catalog(catalog))
}
