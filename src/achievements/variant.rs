//! Variant key parsing
//!
//! Variant keys identify one game configuration. They are parsed exactly once,
//! when the catalog is loaded:
//!
//! ```text
//! 5          board size 5, no target
//! 5x5        same, written as a square
//! 3x3-15     board size 3, numeric target 15
//! 8-perfect  board size 8, unlocked by a perfect run
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static VARIANT_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?P<size>\d{1,3})(?:x(?P<cols>\d{1,3}))?(?:-(?P<suffix>perfect|\d{1,6}))?$").ok()
});

/// Parsed form of a variant key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantSpec {
    /// Scored by a numeric value (usually a completion time)
    ScoreBased { size: u32, target: Option<u32> },
    /// Unlocked by a completion-quality flag
    Perfect { size: u32 },
}

impl VariantSpec {
    /// Parse a variant key, returning `None` for anything outside the grammar
    pub fn parse(key: &str) -> Option<Self> {
        let caps = VARIANT_RE.as_ref()?.captures(key.trim())?;
        let size: u32 = caps.name("size")?.as_str().parse().ok()?;
        if size == 0 {
            return None;
        }

        // Only square boards are expressed as "NxN"
        if let Some(cols) = caps.name("cols") {
            let cols: u32 = cols.as_str().parse().ok()?;
            if cols != size {
                return None;
            }
        }

        match caps.name("suffix").map(|m| m.as_str()) {
            None => Some(Self::ScoreBased { size, target: None }),
            Some("perfect") => Some(Self::Perfect { size }),
            Some(target) => Some(Self::ScoreBased {
                size,
                target: Some(target.parse().ok()?),
            }),
        }
    }

    pub fn is_perfect(&self) -> bool {
        matches!(self, Self::Perfect { .. })
    }
}

impl fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScoreBased { size, target: None } => write!(f, "{size}x{size}"),
            Self::ScoreBased {
                size,
                target: Some(target),
            } => write!(f, "{size}x{size}, target {target}"),
            Self::Perfect { size } => write!(f, "{size}x{size}, perfect"),
        }
    }
}
