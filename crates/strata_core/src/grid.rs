//! # Grids and Chunk Coordinates
//!
//! A `Grid` is one chunk worth of samples. Every layer, modifier and blend
//! consumes and produces grids of the configured chunk size.
//!
//! ## Layout
//!
//! Samples are stored row-major (`y * width + x`). Sample `(0, 0)` is the
//! chunk corner closest to the origin of the sample plane.

use std::fmt;

use crate::error::{TerrainError, TerrainResult};

/// Chunk coordinate (identifies one chunk-sized tile of the infinite plane).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not samples).
    pub x: i32,
    /// Y coordinate (in chunks, not samples).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate offset by `(dx, dy)` chunks.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// Absolute sample origin for kernels that share edge samples with
    /// neighbours (`coord * (dimension - 1)`). The plane wraps at the `i32`
    /// range.
    #[inline]
    #[must_use]
    pub const fn shared_edge_origin(self, width: usize, height: usize) -> (i32, i32) {
        (
            self.x.wrapping_mul((width as i32).wrapping_sub(1)),
            self.y.wrapping_mul((height as i32).wrapping_sub(1)),
        )
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A fixed-size 2D array of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Grid {
    /// Creates a zero-filled grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    /// Creates a grid with every sample set to `value`.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Creates a grid by evaluating `f(x, y)` for every sample.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Wraps row-major samples.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `samples.len() != width * height`.
    pub fn from_samples(width: usize, height: usize, samples: Vec<f32>) -> TerrainResult<Self> {
        if samples.len() != width * height {
            return Err(TerrainError::DimensionMismatch {
                expected: (width, height),
                found: (samples.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Grid width in samples.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Gets the sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "sample ({x}, {y}) outside {}x{} grid", self.width, self.height);
        self.samples[y * self.width + x]
    }

    /// Sets the sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.width && y < self.height, "sample ({x}, {y}) outside {}x{} grid", self.width, self.height);
        self.samples[y * self.width + x] = value;
    }

    /// Row-major view of all samples.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable row-major view of all samples.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Copies out the samples of row `y`.
    #[must_use]
    pub fn row(&self, y: usize) -> Vec<f32> {
        self.samples[y * self.width..(y + 1) * self.width].to_vec()
    }

    /// Copies out the samples of column `x`.
    #[must_use]
    pub fn column(&self, x: usize) -> Vec<f32> {
        (0..self.height).map(|y| self.get(x, y)).collect()
    }

    /// Applies `f` to every sample in place and returns the grid.
    #[must_use]
    pub fn map(mut self, mut f: impl FnMut(f32) -> f32) -> Self {
        for sample in &mut self.samples {
            *sample = f(*sample);
        }
        self
    }

    /// Combines two equally sized grids sample by sample.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the grids differ in size.
    pub fn zip_map(&self, other: &Self, mut f: impl FnMut(f32, f32) -> f32) -> TerrainResult<Self> {
        self.ensure_dimensions(other.width, other.height)?;
        let samples = self
            .samples
            .iter()
            .zip(&other.samples)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            width: self.width,
            height: self.height,
            samples,
        })
    }

    /// Checks that this grid is `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` otherwise.
    pub fn ensure_dimensions(&self, width: usize, height: usize) -> TerrainResult<()> {
        if self.width == width && self.height == height {
            Ok(())
        } else {
            Err(TerrainError::DimensionMismatch {
                expected: (width, height),
                found: (self.width, self.height),
            })
        }
    }

    /// Smallest sample, or `None` for an empty grid.
    #[must_use]
    pub fn min(&self) -> Option<f32> {
        self.samples.iter().copied().reduce(f32::min)
    }

    /// Largest sample, or `None` for an empty grid.
    #[must_use]
    pub fn max(&self) -> Option<f32> {
        self.samples.iter().copied().reduce(f32::max)
    }

    /// Arithmetic mean of all samples, or `None` for an empty grid.
    #[must_use]
    pub fn mean(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        let total: f64 = self.samples.iter().map(|&s| f64::from(s)).sum();
        Some((total / self.samples.len() as f64) as f32)
    }
}
