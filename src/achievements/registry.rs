//! Read-only registry of achievement definitions

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error, info};

use super::catalog::{Catalog, RejectedGame};
use super::definitions::{AchievementDefinition, ProgressKey};

/// Immutable catalog of achievement definitions, keyed by `(game, variant)`
#[derive(Debug, Clone, Default)]
pub struct AchievementRegistry {
    version: u32,
    definitions: BTreeMap<ProgressKey, AchievementDefinition>,
    rejected: Vec<RejectedGame>,
}

impl AchievementRegistry {
    /// Build a registry from an already validated catalog
    pub fn from_catalog(catalog: Catalog) -> Self {
        let definitions: BTreeMap<_, _> = catalog
            .definitions
            .into_iter()
            .map(|def| (def.key(), def))
            .collect();

        info!(
            version = catalog.version,
            definitions = definitions.len(),
            rejected_games = catalog.rejected.len(),
            "Achievement registry loaded"
        );

        Self {
            version: catalog.version,
            definitions,
            rejected: catalog.rejected,
        }
    }

    /// Registry over the embedded default catalog
    pub fn bundled() -> Self {
        Self::from_catalog(Catalog::bundled())
    }

    /// Load from a catalog file, falling back to the bundled catalog when the
    /// file cannot be read
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };

        match Catalog::from_file(path) {
            Ok(catalog) => Self::from_catalog(catalog),
            Err(e) => {
                error!("Using bundled catalog, custom catalog failed: {:#}", e);
                Self::bundled()
            }
        }
    }

    /// Look up the definition for one game configuration
    pub fn lookup(&self, game_id: &str, variant_key: &str) -> Option<&AchievementDefinition> {
        let def = self
            .definitions
            .get(&ProgressKey::new(game_id, variant_key));
        if def.is_none() {
            debug!(game = game_id, variant = variant_key, "No achievement definition");
        }
        def
    }

    pub fn get(&self, key: &ProgressKey) -> Option<&AchievementDefinition> {
        self.definitions.get(key)
    }

    pub fn contains(&self, key: &ProgressKey) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// All definitions in `(game, variant)` order
    pub fn definitions(&self) -> impl Iterator<Item = &AchievementDefinition> {
        self.definitions.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ProgressKey> {
        self.definitions.keys()
    }

    /// Definitions of a single game
    pub fn for_game<'a>(&'a self, game_id: &'a str) -> impl Iterator<Item = &'a AchievementDefinition> {
        self.definitions
            .values()
            .filter(move |def| def.game_id == game_id)
    }

    /// Games dropped while loading the catalog
    pub fn rejected(&self) -> &[RejectedGame] {
        &self.rejected
    }

    /// Total number of unlockable tiers across all definitions
    pub fn total_tiers(&self) -> usize {
        self.definitions.values().map(|d| d.tier_count()).sum()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
