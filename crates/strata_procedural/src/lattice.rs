//! # Lattice Refinement Noise
//!
//! Diamond-square midpoint displacement over one infinite lattice.
//!
//! ## Seamless Chunks
//!
//! Chunk `c` of side `w + 1` is the lattice patch whose corner is `c * w`.
//! Refining a patch reads its neighbours' values near the border, so each call
//! refines the 3x3 block of patches around the target. Every displaced value
//! is drawn from the absolute point it lands on, which makes two chunks agree
//! bit for bit on the samples they share.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strata_core::{ChunkCoord, Grid, TerrainError, TerrainResult};

use crate::kernel::NoiseKernel;
use crate::math::clamp01;
use crate::seed::point_unit;

/// Diamond-square parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeNoise {
    /// Random range shrinks by `2^-smoothness` per refinement step.
    pub smoothness: f32,
    /// Random range of the lattice corners.
    pub random_range: f32,
    /// Raw value mapped to 0.
    pub clamp_min: f32,
    /// Raw value mapped to 1.
    pub clamp_max: f32,
}

impl Default for LatticeNoise {
    fn default() -> Self {
        Self {
            smoothness: 1.0,
            random_range: 1.0,
            clamp_min: -0.5,
            clamp_max: 0.5,
        }
    }
}

/// Square block of lattice values. Loops index it locally; `origin` maps a
/// local index to the absolute (wrapping) lattice point that seeds it.
struct Patch {
    origin_x: i32,
    origin_y: i32,
    side: usize,
    values: Vec<f32>,
}

impl Patch {
    fn new(origin_x: i32, origin_y: i32, side: usize) -> Self {
        Self {
            origin_x,
            origin_y,
            side,
            values: vec![0.0; side * side],
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.side + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: f32) {
        self.values[y * self.side + x] = value;
    }

    /// Sets `(x, y)` to `base` plus the displacement drawn at its absolute point.
    #[inline]
    fn displace(&mut self, x: usize, y: usize, base: f32, seed: i32, range: f32) {
        let ax = self.origin_x.wrapping_add(x as i32);
        let ay = self.origin_y.wrapping_add(y as i32);
        self.set(x, y, base + displacement(ax, ay, seed, range));
    }
}

#[inline]
fn displacement(x: i32, y: i32, seed: i32, range: f32) -> f32 {
    (point_unit(x, y, seed) - 0.5) * range
}

impl LatticeNoise {
    /// Creates parameters with the given smoothness and default ranges.
    #[must_use]
    pub fn new(smoothness: f32) -> Self {
        Self {
            smoothness,
            ..Self::default()
        }
    }

    fn validate(&self, width: usize, height: usize) -> TerrainResult<()> {
        if width != height || width < 2 || !(width - 1).is_power_of_two() {
            return Err(TerrainError::InvalidDimension { width, height });
        }
        if width > (1 << 28) {
            return Err(TerrainError::InvalidDimension { width, height });
        }
        if self.clamp_max.partial_cmp(&self.clamp_min) != Some(Ordering::Greater) {
            return Err(TerrainError::InvalidConfiguration(format!(
                "lattice clamp range [{}, {}] is empty",
                self.clamp_min, self.clamp_max
            )));
        }
        Ok(())
    }
}

impl NoiseKernel for LatticeNoise {
    fn generate(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
        seed: i32,
    ) -> TerrainResult<Grid> {
        self.validate(width, height)?;

        let side = width - 1;
        let (base_x, base_y) = coord.shared_edge_origin(width, height);
        let mut patch = Patch::new(
            base_x.wrapping_sub(side as i32),
            base_y.wrapping_sub(side as i32),
            side * 3 + 1,
        );

        // Corners of the 3x3 block of patches.
        for i in 0..4 {
            for e in 0..4 {
                patch.displace(i * side, e * side, 0.0, seed, self.random_range);
            }
        }

        let (mut start, mut stop) = (0, side * 3);
        let mut range = self.random_range;
        let mut step = side;
        let shrink = 2f32.powf(-self.smoothness);

        while step > 1 {
            let half = step / 2;

            // Diamond: centre of every square.
            for i in (start..stop).step_by(step) {
                for e in (start..stop).step_by(step) {
                    let top_left = patch.get(i, e);
                    let top_right = patch.get(i + step, e);
                    let bottom_left = patch.get(i, e + step);
                    let bottom_right = patch.get(i + step, e + step);
                    let average = (top_left + top_right + bottom_left + bottom_right) / 4.0;

                    patch.displace(i + half, e + half, average, seed, range);
                }
            }

            // Square: edge midpoints with all four neighbours inside the region.
            let mut shifted = false;
            for e in (start + half..stop).step_by(half) {
                let first = if shifted { start + half } else { start + step };
                shifted = !shifted;

                for i in (first..stop).step_by(step) {
                    let top = patch.get(i, e - half);
                    let right = patch.get(i + half, e);
                    let bottom = patch.get(i, e + half);
                    let left = patch.get(i - half, e);
                    let average = (top + right + bottom + left) / 4.0;

                    patch.displace(i, e, average, seed, range);
                }
            }

            range *= shrink;
            start += half;
            stop -= half;
            step = half;
        }

        let scale = self.clamp_max - self.clamp_min;
        Ok(Grid::from_fn(width, height, |x, y| {
            let raw = patch.get(side + x, side + y);
            clamp01((raw - self.clamp_min) / scale)
        }))
    }
}
