//! # Gradient Noise
//!
//! Perlin-style noise: one random unit gradient per lattice point every
//! `resolution` samples, dot products against the four enclosing corners,
//! quintic-faded bilinear blend, remapped from [-1, 1] to [0, 1].
//!
//! Samples that sit exactly on a lattice point always come out as 0.5.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{ChunkCoord, Grid, TerrainError, TerrainResult};

use crate::kernel::NoiseKernel;
use crate::math::{clamp01, fade, lerp};
use crate::seed::point_rng;

/// Gradient noise parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientNoise {
    /// Samples between neighbouring lattice points.
    pub resolution: u32,
}

impl Default for GradientNoise {
    fn default() -> Self {
        Self { resolution: 32 }
    }
}

impl GradientNoise {
    /// Creates gradient noise with the given lattice spacing.
    #[must_use]
    pub const fn new(resolution: u32) -> Self {
        Self { resolution }
    }
}

/// Unit gradient at the absolute lattice point `(x, y)`.
fn gradient_at(x: i32, y: i32, seed: i32) -> (f32, f32) {
    let mut rng = point_rng(x, y, seed);
    let gx = rng.gen::<f32>() - 0.5;
    let gy = rng.gen::<f32>() - 0.5;
    let length = gx.hypot(gy);
    if length <= f32::EPSILON {
        (1.0, 0.0)
    } else {
        (gx / length, gy / length)
    }
}

#[inline]
fn dot(offset: (f32, f32), gradient: (f32, f32)) -> f32 {
    offset.0 * gradient.0 + offset.1 * gradient.1
}

/// Gradients for every lattice point covering one chunk, indexed in `i64` so
/// chunks at the edge of the wrapped `i32` plane do not overflow.
struct GradientTable {
    min_x: i64,
    min_y: i64,
    columns: usize,
    gradients: Vec<(f32, f32)>,
}

impl GradientTable {
    fn build(lattice_x: (i64, i64), lattice_y: (i64, i64), resolution: i64, seed: i32) -> Self {
        let columns = (lattice_x.1 - lattice_x.0 + 1) as usize;
        let rows = (lattice_y.1 - lattice_y.0 + 1) as usize;
        let mut gradients = Vec::with_capacity(columns * rows);
        for gy in lattice_y.0..=lattice_y.1 {
            for gx in lattice_x.0..=lattice_x.1 {
                gradients.push(gradient_at(
                    (gx * resolution) as i32,
                    (gy * resolution) as i32,
                    seed,
                ));
            }
        }
        Self {
            min_x: lattice_x.0,
            min_y: lattice_y.0,
            columns,
            gradients,
        }
    }

    #[inline]
    fn get(&self, gx: i64, gy: i64) -> (f32, f32) {
        let column = (gx - self.min_x) as usize;
        let row = (gy - self.min_y) as usize;
        self.gradients[row * self.columns + column]
    }
}

impl NoiseKernel for GradientNoise {
    fn generate(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
        seed: i32,
    ) -> TerrainResult<Grid> {
        if self.resolution == 0 || self.resolution > i32::MAX as u32 {
            return Err(TerrainError::InvalidConfiguration(format!(
                "gradient resolution must be in 1..={}, got {}",
                i32::MAX,
                self.resolution
            )));
        }
        if width == 0 || height == 0 {
            return Ok(Grid::new(width, height));
        }

        let resolution = i64::from(self.resolution);
        let scale = self.resolution as f32;
        let (base_x, base_y) = coord.shared_edge_origin(width, height);
        let (base_x, base_y) = (i64::from(base_x), i64::from(base_y));
        let last_x = base_x + width as i64 - 1;
        let last_y = base_y + height as i64 - 1;

        let table = GradientTable::build(
            (base_x.div_euclid(resolution), last_x.div_euclid(resolution) + 1),
            (base_y.div_euclid(resolution), last_y.div_euclid(resolution) + 1),
            resolution,
            seed,
        );

        Ok(Grid::from_fn(width, height, |x, y| {
            let ax = base_x + x as i64;
            let ay = base_y + y as i64;
            let (gx, gy) = (ax.div_euclid(resolution), ay.div_euclid(resolution));
            let u = ax.rem_euclid(resolution) as f32 / scale;
            let v = ay.rem_euclid(resolution) as f32 / scale;

            let d00 = dot((u, v), table.get(gx, gy));
            let d10 = dot((u - 1.0, v), table.get(gx + 1, gy));
            let d11 = dot((u - 1.0, v - 1.0), table.get(gx + 1, gy + 1));
            let d01 = dot((u, v - 1.0), table.get(gx, gy + 1));

            let fu = fade(u);
            let top = lerp(d00, d10, fu);
            let bottom = lerp(d01, d11, fu);
            clamp01((1.0 + lerp(top, bottom, fade(v))) * 0.5)
        }))
    }
}
