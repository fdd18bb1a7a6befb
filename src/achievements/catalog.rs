//! Achievement catalog loading
//!
//! The default catalog is embedded at compile time from `assets/catalog.toml`.
//! Each game is validated on its own: a game with a malformed entry is dropped
//! as a whole and logged, while every other game still loads.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{error, warn};

use super::definitions::{AchievementDefinition, TierPolicy, UnlockMode, MAX_TIERS};
use super::variant::VariantSpec;

/// Embedded default catalog (compile-time)
pub const BUNDLED_CATALOG_TOML: &str = include_str!("../../assets/catalog.toml");

/// Why a game was dropped from the catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("game entry #{0} is not a valid table: {1}")]
    InvalidGame(usize, String),

    #[error("duplicate game id")]
    DuplicateGame,

    #[error("unparsable variant key '{0}'")]
    InvalidVariant(String),

    #[error("variant '{0}' is listed twice")]
    DuplicateVariant(String),

    #[error("variant '{variant}' declares mode {declared} but its key implies {implied}")]
    ModeMismatch {
        variant: String,
        declared: &'static str,
        implied: &'static str,
    },

    #[error("variant '{0}' needs between 1 and {MAX_TIERS} thresholds, got {1}")]
    ThresholdCount(String, usize),

    #[error("variant '{0}' has a negative or non-finite threshold")]
    ThresholdValue(String),

    #[error("variant '{0}' thresholds must go from loosest to strictest")]
    ThresholdOrder(String),

    #[error("perfect variant '{0}' must not declare thresholds")]
    PerfectWithThresholds(String),
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    game: Vec<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    id: String,
    #[serde(default)]
    achievement: Vec<RawAchievement>,
}

#[derive(Debug, Deserialize)]
struct RawAchievement {
    variant: String,
    #[serde(default)]
    thresholds: Vec<f64>,
    #[serde(default)]
    mode: Option<UnlockMode>,
    #[serde(default = "default_cascade")]
    cascade: bool,
}

fn default_cascade() -> bool {
    true
}

/// A game that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedGame {
    pub game_id: String,
    pub reason: CatalogError,
}

/// Validated catalog contents
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub version: u32,
    pub definitions: Vec<AchievementDefinition>,
    pub rejected: Vec<RejectedGame>,
}

impl Catalog {
    /// Parse the embedded default catalog.
    ///
    /// A broken embedded catalog yields an empty catalog: no game unlocks
    /// anything, but the host keeps running.
    pub fn bundled() -> Self {
        match Self::parse(BUNDLED_CATALOG_TOML) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Bundled achievement catalog is unreadable: {}", e);
                Self::default()
            }
        }
    }

    /// Load a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
    }

    /// Parse catalog TOML.
    ///
    /// Only a document that is not TOML at all is an error. Individual games
    /// that fail validation end up in `rejected`.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawCatalog = toml::from_str(content)?;
        let mut catalog = Catalog {
            version: raw.version,
            ..Default::default()
        };
        let mut seen_games = HashSet::new();

        for (index, value) in raw.game.into_iter().enumerate() {
            let fallback_id = value
                .get("id")
                .and_then(|id| id.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index));

            let game: RawGame = match value.try_into() {
                Ok(game) => game,
                Err(e) => {
                    catalog.reject(fallback_id, CatalogError::InvalidGame(index, e.to_string()));
                    continue;
                }
            };

            if !seen_games.insert(game.id.clone()) {
                catalog.reject(game.id, CatalogError::DuplicateGame);
                continue;
            }

            match validate_game(&game) {
                Ok(definitions) => catalog.definitions.extend(definitions),
                Err(reason) => catalog.reject(game.id, reason),
            }
        }

        Ok(catalog)
    }

    fn reject(&mut self, game_id: String, reason: CatalogError) {
        warn!(
            game = %game_id,
            "Dropping achievements for game: {}",
            reason
        );
        self.rejected.push(RejectedGame { game_id, reason });
    }
}

fn validate_game(game: &RawGame) -> Result<Vec<AchievementDefinition>, CatalogError> {
    let mut variants = HashSet::new();
    let mut definitions = Vec::with_capacity(game.achievement.len());

    for raw in &game.achievement {
        let variant = VariantSpec::parse(&raw.variant)
            .ok_or_else(|| CatalogError::InvalidVariant(raw.variant.clone()))?;

        if !variants.insert(raw.variant.clone()) {
            return Err(CatalogError::DuplicateVariant(raw.variant.clone()));
        }

        let implied = if variant.is_perfect() {
            UnlockMode::BinaryPerfect
        } else {
            UnlockMode::TimeAscending
        };
        if let Some(declared) = raw.mode {
            if declared != implied {
                return Err(CatalogError::ModeMismatch {
                    variant: raw.variant.clone(),
                    declared: declared.as_str(),
                    implied: implied.as_str(),
                });
            }
        }

        match implied {
            UnlockMode::BinaryPerfect => {
                if !raw.thresholds.is_empty() {
                    return Err(CatalogError::PerfectWithThresholds(raw.variant.clone()));
                }
            }
            UnlockMode::TimeAscending => validate_thresholds(&raw.variant, &raw.thresholds)?,
        }

        definitions.push(AchievementDefinition {
            game_id: game.id.clone(),
            variant_key: raw.variant.clone(),
            variant,
            thresholds: raw.thresholds.clone(),
            mode: implied,
            policy: if raw.cascade {
                TierPolicy::Cascade
            } else {
                TierPolicy::StrictestOnly
            },
        });
    }

    Ok(definitions)
}

fn validate_thresholds(variant: &str, thresholds: &[f64]) -> Result<(), CatalogError> {
    if thresholds.is_empty() || thresholds.len() > MAX_TIERS {
        return Err(CatalogError::ThresholdCount(
            variant.to_string(),
            thresholds.len(),
        ));
    }
    if thresholds.iter().any(|t| !t.is_finite() || *t < 0.0) {
        return Err(CatalogError::ThresholdValue(variant.to_string()));
    }
    if thresholds.windows(2).any(|pair| pair[1] >= pair[0]) {
        return Err(CatalogError::ThresholdOrder(variant.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads_every_game() {
        let catalog = Catalog::bundled();
        assert!(catalog.version > 0);
        assert!(catalog.rejected.is_empty(), "{:?}", catalog.rejected);

        let games: HashSet<_> = catalog.definitions.iter().map(|d| d.game_id.as_str()).collect();
        for game in ["schulte", "digits", "queens", "tango"] {
            assert!(games.contains(game), "missing {game}");
        }

        let digits = catalog
            .definitions
            .iter()
            .find(|d| d.game_id == "digits" && d.variant_key == "4x4-20")
            .unwrap();
        assert_eq!(
            digits.variant,
            VariantSpec::ScoreBased {
                size: 4,
                target: Some(20)
            }
        );
    }

    #[test]
    fn test_malformed_game_is_dropped_alone() {
        let catalog = Catalog::parse(
            r#"
            version = 1

            [[game]]
            id = "schulte"
            [[game.achievement]]
            variant = "5x5"
            thresholds = [60.0, 40.0]

            [[game]]
            id = "digits"
            [[game.achievement]]
            variant = "3x3-15"
            thresholds = [30.0, 45.0]
            "#,
        )
        .unwrap();

        assert_eq!(catalog.definitions.len(), 1);
        assert_eq!(catalog.definitions[0].game_id, "schulte");
        assert_eq!(catalog.rejected.len(), 1);
        assert_eq!(catalog.rejected[0].game_id, "digits");
        assert_eq!(
            catalog.rejected[0].reason,
            CatalogError::ThresholdOrder("3x3-15".to_string())
        );
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let cases = [
            (r#"variant = "5x5""#, "count"),
            (r#"variant = "5x5"
thresholds = [4.0, 3.0, 2.0, 1.0]"#, "count"),
            (r#"variant = "5x5"
thresholds = [-1.0]"#, "value"),
            (r#"variant = "8-perfect"
thresholds = [10.0]"#, "perfect"),
            (r#"variant = "8-perfect"
mode = "time-ascending""#, "mode"),
            (r#"variant = "huge"
thresholds = [10.0]"#, "variant"),
        ];

        for (entry, label) in cases {
            let toml = format!("[[game]]\nid = \"g\"\n[[game.achievement]]\n{entry}\n");
            let catalog = Catalog::parse(&toml).unwrap();
            assert!(catalog.definitions.is_empty(), "case {label} should be rejected");
            assert_eq!(catalog.rejected.len(), 1, "case {label}");
        }
    }

    #[test]
    fn test_wrongly_typed_game_and_duplicates() {
        let catalog = Catalog::parse(
            r#"
            [[game]]
            id = "tango"
            achievement = "nope"

            [[game]]
            id = "queens"
            [[game.achievement]]
            variant = "8-perfect"

            [[game]]
            id = "queens"
            [[game.achievement]]
            variant = "6-perfect"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.definitions.len(), 1);
        assert_eq!(catalog.definitions[0].variant_key, "8-perfect");
        assert_eq!(catalog.definitions[0].mode, UnlockMode::BinaryPerfect);
        let rejected: Vec<_> = catalog.rejected.iter().map(|r| r.game_id.as_str()).collect();
        assert_eq!(rejected, vec!["tango", "queens"]);
        assert_eq!(catalog.rejected[1].reason, CatalogError::DuplicateGame);
    }

    #[test]
    fn test_cascade_flag_maps_to_policy() {
        let catalog = Catalog::parse(
            r#"
            [[game]]
            id = "schulte"
            [[game.achievement]]
            variant = "4"
            thresholds = [30.0, 20.0]
            cascade = false
            "#,
        )
        .unwrap();
        assert_eq!(catalog.definitions[0].policy, TierPolicy::StrictestOnly);
    }
}
