//! Built-in modifiers, applied to each layer's output before blending.

use serde::{Deserialize, Serialize};
use strata_core::{Grid, Modifier};

/// A built-in modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModifierKind {
    /// Leaves the grid unchanged.
    #[default]
    Identity,
    /// Multiplies every sample by `factor`.
    Scale {
        /// Multiplier.
        factor: f32,
    },
    /// Raises every sample to `exponent`.
    Power {
        /// Exponent.
        exponent: f32,
    },
    /// `0.95 * v^2 + 0.05`: flattens lowlands, keeps a floor above zero.
    TerrainEase,
}

/// The terrain easing curve.
#[inline]
#[must_use]
pub fn terrain_ease(value: f32) -> f32 {
    (1.0 - 0.05) * value * value + 0.05
}

impl Modifier for ModifierKind {
    fn modify(&self, grid: Grid) -> Grid {
        match *self {
            Self::Identity => grid,
            Self::Scale { factor } => grid.map(|v| v * factor),
            Self::Power { exponent } => grid.map(|v| v.powf(exponent)),
            Self::TerrainEase => grid.map(terrain_ease),
        }
    }
}
