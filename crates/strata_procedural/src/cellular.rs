//! # Cellular Noise
//!
//! Worley noise over a grid of `cell_width` x `cell_height` cells with one
//! jittered feature point per cell. Each sample looks at the 3x3 cells around
//! its own and keeps the nearest (and second-nearest) feature distance.
//!
//! ## Variants
//!
//! - `CellularNoise`: faded, normalised distance to the nearest point
//! - `CellEdgeNoise`: ridges where the two nearest points are equally far
//!
//! Both accept a `DistanceMetric`; the wavy metric bends cell borders with a
//! cosine of the direction to the feature point.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{ChunkCoord, Grid, TerrainError, TerrainResult};

use crate::kernel::NoiseKernel;
use crate::math::{clamp01, fade};
use crate::seed::point_rng;

/// How the distance from a sample to a feature point is measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Euclidean distance plus `cos(angle * frequency) * amplitude`, where
    /// `angle` is the direction from the feature point. The wave grows
    /// linearly up to full amplitude at `max_amplitude_distance`.
    Wavy {
        /// Waves per half turn.
        frequency: f32,
        /// Peak distance offset.
        amplitude: f32,
        /// Distance at which the wave reaches full amplitude. Zero or less
        /// applies full amplitude everywhere.
        max_amplitude_distance: f32,
    },
}

impl DistanceMetric {
    /// Distance for the offset `(dx, dy)` from a feature point.
    #[must_use]
    pub fn distance(&self, dx: f32, dy: f32) -> f32 {
        let euclidean = dx.hypot(dy);
        match *self {
            Self::Euclidean => euclidean,
            Self::Wavy {
                frequency,
                amplitude,
                max_amplitude_distance,
            } => {
                // A sample on top of its feature point has no direction.
                let angle = if euclidean == 0.0 {
                    0.0
                } else {
                    (dx / euclidean).clamp(-1.0, 1.0).acos()
                };
                let reach = if max_amplitude_distance <= 0.0 {
                    1.0
                } else {
                    euclidean.min(max_amplitude_distance) / max_amplitude_distance
                };
                euclidean + (angle * frequency).cos() * amplitude * reach
            }
        }
    }
}

/// Feature points of every cell around one chunk, stored as offsets from
/// their cell's corner. Cell indices are `i64` so chunks at the edge of the
/// wrapped `i32` plane do not overflow.
struct CellField {
    min_x: i64,
    min_y: i64,
    columns: usize,
    points: Vec<(f32, f32)>,
}

impl CellField {
    /// Places one point per cell for cells `x.0..=x.1` by `y.0..=y.1`.
    fn build(x: (i64, i64), y: (i64, i64), cell: (i64, i64), seed: i32) -> Self {
        let columns = (x.1 - x.0 + 1) as usize;
        let rows = (y.1 - y.0 + 1) as usize;
        let mut points = Vec::with_capacity(columns * rows);
        for cy in y.0..=y.1 {
            for cx in x.0..=x.1 {
                let mut rng = point_rng(cx as i32, cy as i32, seed);
                let jitter_x = rng.gen::<f32>();
                let jitter_y = rng.gen::<f32>();
                points.push((jitter_x * cell.0 as f32, jitter_y * cell.1 as f32));
            }
        }
        Self {
            min_x: x.0,
            min_y: y.0,
            columns,
            points,
        }
    }

    #[inline]
    fn get(&self, cx: i64, cy: i64) -> (f32, f32) {
        let column = (cx - self.min_x) as usize;
        let row = (cy - self.min_y) as usize;
        self.points[row * self.columns + column]
    }
}

/// Shared sampling loop: calls `shade(nearest, second_nearest)` per sample.
fn sample_cells(
    coord: ChunkCoord,
    width: usize,
    height: usize,
    seed: i32,
    cell: (u32, u32),
    metric: DistanceMetric,
    shade: impl Fn(f32, f32) -> f32,
) -> TerrainResult<Grid> {
    if cell.0 == 0 || cell.1 == 0 || cell.0 > i32::MAX as u32 || cell.1 > i32::MAX as u32 {
        return Err(TerrainError::InvalidConfiguration(format!(
            "cell size must be positive, got {}x{}",
            cell.0, cell.1
        )));
    }
    if width == 0 || height == 0 {
        return Ok(Grid::new(width, height));
    }

    let cell = (i64::from(cell.0), i64::from(cell.1));
    let (base_x, base_y) = coord.shared_edge_origin(width, height);
    let (base_x, base_y) = (i64::from(base_x), i64::from(base_y));
    let last_x = base_x + width as i64 - 1;
    let last_y = base_y + height as i64 - 1;

    let field = CellField::build(
        (base_x.div_euclid(cell.0) - 1, last_x.div_euclid(cell.0) + 1),
        (base_y.div_euclid(cell.1) - 1, last_y.div_euclid(cell.1) + 1),
        cell,
        seed,
    );

    Ok(Grid::from_fn(width, height, |x, y| {
        let ax = base_x + x as i64;
        let ay = base_y + y as i64;
        let (cx, cy) = (ax.div_euclid(cell.0), ay.div_euclid(cell.1));

        let mut nearest = f32::INFINITY;
        let mut second = f32::INFINITY;
        for ny in cy - 1..=cy + 1 {
            for nx in cx - 1..=cx + 1 {
                let (px, py) = field.get(nx, ny);
                let dx = (ax - nx * cell.0) as f32 - px;
                let dy = (ay - ny * cell.1) as f32 - py;
                let distance = metric.distance(dx, dy);
                if distance < nearest {
                    second = nearest;
                    nearest = distance;
                } else if distance < second {
                    second = distance;
                }
            }
        }
        shade(nearest, second)
    }))
}

/// Worley distance noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularNoise {
    /// Cell width in samples.
    pub cell_width: u32,
    /// Cell height in samples.
    pub cell_height: u32,
    /// Distance mapped to 0.
    pub min_distance: f32,
    /// Distance mapped to 1.
    pub max_distance: f32,
    /// Output `1 - value` instead.
    pub inverse: bool,
    /// Added to the generator seed so layers can decorrelate.
    pub seed_offset: i32,
    /// Distance metric.
    pub metric: DistanceMetric,
}

impl Default for CellularNoise {
    fn default() -> Self {
        Self {
            cell_width: 32,
            cell_height: 32,
            min_distance: 0.0,
            max_distance: 32.0,
            inverse: false,
            seed_offset: 0,
            metric: DistanceMetric::Euclidean,
        }
    }
}

impl CellularNoise {
    /// Creates square-cell noise mapping `0..cell_size` to `[0, 1]`.
    #[must_use]
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_width: cell_size,
            cell_height: cell_size,
            max_distance: cell_size as f32,
            ..Self::default()
        }
    }
}

impl NoiseKernel for CellularNoise {
    fn generate(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
        seed: i32,
    ) -> TerrainResult<Grid> {
        if self.max_distance.partial_cmp(&self.min_distance) != Some(Ordering::Greater) {
            return Err(TerrainError::InvalidConfiguration(format!(
                "cellular distance range [{}, {}] is empty",
                self.min_distance, self.max_distance
            )));
        }
        let span = self.max_distance - self.min_distance;
        sample_cells(
            coord,
            width,
            height,
            seed.wrapping_add(self.seed_offset),
            (self.cell_width, self.cell_height),
            self.metric,
            |nearest, _| {
                let value = clamp01(fade(clamp01((nearest - self.min_distance) / span)));
                if self.inverse {
                    1.0 - value
                } else {
                    value
                }
            },
        )
    }
}

/// Worley ridge noise along the borders between cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellEdgeNoise {
    /// Cell width in samples.
    pub cell_width: u32,
    /// Cell height in samples.
    pub cell_height: u32,
    /// Nearest distance at and beyond which the distance term saturates.
    pub min_distance: f32,
    /// Second-minus-first distance mapped to 0.
    pub min_difference: f32,
    /// Second-minus-first distance mapped to 1.
    pub max_difference: f32,
    /// Output `1 - value` instead (bright ridges).
    pub inverse: bool,
    /// Added to the generator seed so layers can decorrelate.
    pub seed_offset: i32,
    /// Distance metric.
    pub metric: DistanceMetric,
}

impl Default for CellEdgeNoise {
    fn default() -> Self {
        Self {
            cell_width: 32,
            cell_height: 32,
            min_distance: 4.0,
            min_difference: 0.0,
            max_difference: 8.0,
            inverse: false,
            seed_offset: 0,
            metric: DistanceMetric::Euclidean,
        }
    }
}

impl NoiseKernel for CellEdgeNoise {
    fn generate(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
        seed: i32,
    ) -> TerrainResult<Grid> {
        if self.min_distance.partial_cmp(&0.0) != Some(Ordering::Greater) {
            return Err(TerrainError::InvalidConfiguration(format!(
                "cell edge min_distance must be positive, got {}",
                self.min_distance
            )));
        }
        if self.max_difference.partial_cmp(&self.min_difference) != Some(Ordering::Greater) {
            return Err(TerrainError::InvalidConfiguration(format!(
                "cell edge difference range [{}, {}] is empty",
                self.min_difference, self.max_difference
            )));
        }
        let span = self.max_difference - self.min_difference;
        sample_cells(
            coord,
            width,
            height,
            seed.wrapping_add(self.seed_offset),
            (self.cell_width, self.cell_height),
            self.metric,
            |nearest, second| {
                let distance_term = clamp01(nearest / self.min_distance);
                let difference_term = clamp01((second - nearest - self.min_difference) / span);
                let value = clamp01(fade(distance_term.min(difference_term)));
                if self.inverse {
                    1.0 - value
                } else {
                    value
                }
            },
        )
    }
}
