//! Built-in blends, folding each modified layer into the running result.

use serde::{Deserialize, Serialize};
use strata_core::{Blend, Grid, TerrainResult};

fn one() -> f32 {
    1.0
}

/// A built-in blend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlendKind {
    /// `accumulated * upper_weight + next * next_weight`.
    Addition {
        /// Weight of the running result.
        #[serde(default = "one")]
        upper_weight: f32,
        /// Weight of the next layer.
        #[serde(default = "one")]
        next_weight: f32,
    },
    /// Lowers the running elevation by `next * strength`, where strength
    /// fades from `max_carve_strength` at `min_elevation_for_max_carve` and
    /// below, to 0 at `max_elevation_for_carve` and above.
    RiverCarve {
        /// Elevation from which nothing is carved.
        max_elevation_for_carve: f32,
        /// Elevation up to which the full strength applies.
        min_elevation_for_max_carve: f32,
        /// Strength at low elevations.
        max_carve_strength: f32,
    },
}

impl Default for BlendKind {
    fn default() -> Self {
        Self::Addition {
            upper_weight: 1.0,
            next_weight: 1.0,
        }
    }
}

impl BlendKind {
    fn carve_strength(elevation: f32, max_elevation: f32, min_elevation: f32, strength: f32) -> f32 {
        if elevation <= min_elevation {
            strength
        } else if elevation >= max_elevation {
            0.0
        } else {
            strength * ((max_elevation - elevation) / (max_elevation - min_elevation))
        }
    }
}

impl Blend for BlendKind {
    fn blend(&self, accumulated: Grid, next: Grid) -> TerrainResult<Grid> {
        match *self {
            Self::Addition {
                upper_weight,
                next_weight,
            } => accumulated.zip_map(&next, |a, b| a * upper_weight + b * next_weight),
            Self::RiverCarve {
                max_elevation_for_carve,
                min_elevation_for_max_carve,
                max_carve_strength,
            } => accumulated.zip_map(&next, |elevation, river| {
                let strength = Self::carve_strength(
                    elevation,
                    max_elevation_for_carve,
                    min_elevation_for_max_carve,
                    max_carve_strength,
                );
                elevation - river * strength
            }),
        }
    }
}
