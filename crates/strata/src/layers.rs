//! # Built-in Layers
//!
//! Every layer compute a terrain config can name, as one tagged enum.
//!
//! | kind                   | reads                  | output                               |
//! |------------------------|------------------------|--------------------------------------|
//! | `lattice`              | -                      | diamond-square noise                 |
//! | `gradient`             | -                      | gradient noise                       |
//! | `cellular`             | -                      | Worley distance noise                |
//! | `cell_edges`           | -                      | Worley ridge noise                   |
//! | `white_noise`          | -                      | uncorrelated samples                 |
//! | `feature_result`       | first feature          | a copy, or zeros without a feature   |
//! | `water_from_elevation` | first feature          | 1 at or below `water_level`, else 0  |
//! | `water_proximity`      | first feature          | closeness to the nearest water cell  |

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strata_core::{ComputeContext, Feature, Grid, LayerCompute, TerrainError, TerrainResult};
use strata_procedural::{
    CellEdgeNoise, CellularNoise, GradientNoise, LatticeNoise, NoiseKernel, WhiteNoise,
};

/// Threshold above which a water sample counts as water.
pub const WATER_THRESHOLD: f32 = 0.001;

/// A built-in layer compute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerKind {
    /// Lattice-refinement (diamond-square) noise.
    Lattice(LatticeNoise),
    /// Gradient (Perlin-style) noise.
    Gradient(GradientNoise),
    /// Cell-distance (Worley) noise.
    Cellular(CellularNoise),
    /// Cell-edge ridge noise.
    CellEdges(CellEdgeNoise),
    /// Uniform white noise.
    WhiteNoise(WhiteNoise),
    /// Copies the first feature dependency.
    FeatureResult,
    /// Water mask from the first feature dependency (an elevation).
    WaterFromElevation {
        /// Elevations at or below this are water.
        water_level: f32,
    },
    /// Proximity to water in the first feature dependency (a water mask).
    WaterProximity {
        /// Distance in samples at which proximity reaches 0.
        max_distance: u32,
    },
}

impl LayerKind {
    /// Short name used in config files and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Lattice(_) => "lattice",
            Self::Gradient(_) => "gradient",
            Self::Cellular(_) => "cellular",
            Self::CellEdges(_) => "cell_edges",
            Self::WhiteNoise(_) => "white_noise",
            Self::FeatureResult => "feature_result",
            Self::WaterFromElevation { .. } => "water_from_elevation",
            Self::WaterProximity { .. } => "water_proximity",
        }
    }

    fn noise(kernel: &dyn NoiseKernel, ctx: &ComputeContext<'_>) -> TerrainResult<Grid> {
        kernel.generate(ctx.coord, ctx.width, ctx.height, ctx.seed)
    }

    fn required_feature<'a>(&self, ctx: &ComputeContext<'a>) -> TerrainResult<&'a Feature> {
        ctx.features.first().map(|feature| &**feature).ok_or_else(|| {
            TerrainError::InvalidConfiguration(format!(
                "{} layer needs a feature dependency",
                self.kind()
            ))
        })
    }
}

impl LayerCompute for LayerKind {
    fn compute(&self, ctx: &ComputeContext<'_>) -> TerrainResult<Grid> {
        match self {
            Self::Lattice(noise) => Self::noise(noise, ctx),
            Self::Gradient(noise) => Self::noise(noise, ctx),
            Self::Cellular(noise) => Self::noise(noise, ctx),
            Self::CellEdges(noise) => Self::noise(noise, ctx),
            Self::WhiteNoise(noise) => Self::noise(noise, ctx),
            Self::FeatureResult => match ctx.features.first() {
                Some(feature) => feature.evaluate(ctx.x(), ctx.y()),
                None => Ok(ctx.blank()),
            },
            Self::WaterFromElevation { water_level } => {
                let level = *water_level;
                let elevation = self.required_feature(ctx)?.evaluate(ctx.x(), ctx.y())?;
                Ok(elevation.map(|v| if v <= level { 1.0 } else { 0.0 }))
            }
            Self::WaterProximity { max_distance } => {
                let water = self.required_feature(ctx)?;
                water_proximity(water, ctx, *max_distance)
            }
        }
    }
}

/// Breadth-first 8-connected distance from the nearest water sample, read
/// over enough neighbouring chunks to cover `max_distance`.
fn water_proximity(
    water: &Feature,
    ctx: &ComputeContext<'_>,
    max_distance: u32,
) -> TerrainResult<Grid> {
    if max_distance == 0 {
        return Err(TerrainError::InvalidConfiguration(
            "water_proximity max_distance must be positive".into(),
        ));
    }
    let (width, height) = (ctx.width, ctx.height);
    if width == 0 || height == 0 {
        return Ok(ctx.blank());
    }

    let reach = max_distance as usize;
    let margin_x = reach.div_ceil(width);
    let margin_y = reach.div_ceil(height);
    let span_x = width * (margin_x * 2 + 1);
    let span_y = height * (margin_y * 2 + 1);

    // -1 = not reached yet, otherwise steps from the nearest water sample.
    let mut distances = vec![-1i32; span_x * span_y];
    let mut frontier = VecDeque::new();

    for chunk_x in 0..=margin_x * 2 {
        for chunk_y in 0..=margin_y * 2 {
            let neighbour = ctx.coord.offset(
                chunk_x as i32 - margin_x as i32,
                chunk_y as i32 - margin_y as i32,
            );
            let grid = water.evaluate(neighbour.x, neighbour.y)?;
            grid.ensure_dimensions(width, height)?;
            for y in 0..height {
                for x in 0..width {
                    if grid.get(x, y) > WATER_THRESHOLD {
                        let px = chunk_x * width + x;
                        let py = chunk_y * height + y;
                        distances[py * span_x + px] = 0;
                        frontier.push_back((px, py));
                    }
                }
            }
        }
    }

    while let Some((px, py)) = frontier.pop_front() {
        let next = distances[py * span_x + px] + 1;
        for ny in py.saturating_sub(1)..=(py + 1).min(span_y - 1) {
            for nx in px.saturating_sub(1)..=(px + 1).min(span_x - 1) {
                let slot = &mut distances[ny * span_x + nx];
                if *slot < 0 {
                    *slot = next;
                    frontier.push_back((nx, ny));
                }
            }
        }
    }

    let limit = max_distance as f32;
    let (origin_x, origin_y) = (margin_x * width, margin_y * height);
    Ok(Grid::from_fn(width, height, |x, y| {
        let distance = distances[(origin_y + y) * span_x + origin_x + x];
        if distance < 0 {
            0.0
        } else {
            (limit - distance as f32).max(0.0) / limit
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use strata_core::{ChunkCoord, FeatureSpec, GenerationOptions, Layer, LayerSpec};

    use super::*;

    fn options() -> GenerationOptions {
        GenerationOptions::new(9, 4).with_initial_cache(2, 2).with_expand_margin(1)
    }

    fn feature(name: &str, layer: LayerSpec) -> Arc<Feature> {
        let spec = FeatureSpec::new(name)
            .with_layer(layer)
            .with_modifier(|grid: Grid| grid);
        Arc::new(Feature::new(spec, options(), &HashMap::new()).unwrap())
    }

    fn layer_over(kind: LayerKind, features: Vec<Arc<Feature>>) -> Layer {
        Layer::new("under_test", Arc::new(kind), options(), features, Vec::new())
    }

    /// Water only in chunk (0, 0), sample (4, 4).
    fn single_pond() -> Arc<Feature> {
        feature(
            "water",
            LayerSpec::from_fn("pond", |ctx| {
                let mut grid = ctx.blank();
                if ctx.coord == ChunkCoord::new(0, 0) {
                    grid.set(4, 4, 1.0);
                }
                Ok(grid)
            }),
        )
    }

    #[test]
    fn test_noise_kinds_match_kernels() {
        let kernel = GradientNoise::new(4);
        let layer = layer_over(LayerKind::Gradient(kernel), Vec::new());
        assert_eq!(
            layer.evaluate(1, 2).unwrap(),
            kernel.generate(ChunkCoord::new(1, 2), 9, 9, 4).unwrap()
        );
    }

    #[test]
    fn test_feature_result() {
        let source = feature(
            "source",
            LayerSpec::from_fn("ramp", |ctx| Ok(Grid::from_fn(ctx.width, ctx.height, |x, _| x as f32))),
        );
        let copy = layer_over(LayerKind::FeatureResult, vec![Arc::clone(&source)]);
        assert_eq!(copy.evaluate(3, 3).unwrap(), source.evaluate(3, 3).unwrap());

        let empty = layer_over(LayerKind::FeatureResult, Vec::new());
        assert_eq!(empty.evaluate(0, 0).unwrap(), Grid::new(9, 9));
    }

    #[test]
    fn test_water_from_elevation() {
        let elevation = feature(
            "elevation",
            LayerSpec::from_fn("ramp", |ctx| {
                Ok(Grid::from_fn(ctx.width, ctx.height, |x, _| x as f32 / 8.0))
            }),
        );
        let water = layer_over(LayerKind::WaterFromElevation { water_level: 0.25 }, vec![elevation]);
        let grid = water.evaluate(0, 0).unwrap();

        assert_eq!(grid.row(0), vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_water_layers_need_a_feature() {
        for kind in [
            LayerKind::WaterFromElevation { water_level: 0.5 },
            LayerKind::WaterProximity { max_distance: 4 },
        ] {
            let layer = layer_over(kind, Vec::new());
            assert!(matches!(
                layer.evaluate(0, 0),
                Err(TerrainError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_water_proximity_falls_off() {
        let proximity = layer_over(LayerKind::WaterProximity { max_distance: 4 }, vec![single_pond()]);
        let grid = proximity.evaluate(0, 0).unwrap();

        assert_eq!(grid.get(4, 4), 1.0);
        assert_eq!(grid.get(5, 5), 0.75);
        assert_eq!(grid.get(6, 4), 0.5);
        assert_eq!(grid.get(8, 0), 0.0);
        assert_eq!(grid.get(0, 8), 0.0);
    }

    #[test]
    fn test_water_proximity_crosses_chunks() {
        let proximity = layer_over(LayerKind::WaterProximity { max_distance: 8 }, vec![single_pond()]);

        // Chunk (1, 0) starts 5 samples to the right of the pond.
        let right = proximity.evaluate(1, 0).unwrap();
        assert_eq!(right.get(0, 4), 3.0 / 8.0);

        let far = proximity.evaluate(3, 3).unwrap();
        assert_eq!(far, Grid::new(9, 9));
    }
}
