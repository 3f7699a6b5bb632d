//! Generation options shared by every layer and feature of a generator.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Chunk size, seed and cache sizing for one generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Samples per chunk along X.
    pub chunk_width: usize,
    /// Samples per chunk along Y.
    pub chunk_height: usize,
    /// Base seed handed to every layer compute.
    pub seed: i32,
    /// Initial cache width in chunks (centred on the origin).
    pub initial_width: usize,
    /// Initial cache height in chunks (centred on the origin).
    pub initial_height: usize,
    /// Extra chunks reserved beyond a violated bound when a cache grows.
    pub cache_expand_margin: usize,
}

impl GenerationOptions {
    /// Default chunk side: 2^7 + 1, valid for every kernel.
    pub const DEFAULT_CHUNK_SIZE: usize = 129;

    /// Creates options for square chunks of side `chunk_size`.
    #[must_use]
    pub fn new(chunk_size: usize, seed: i32) -> Self {
        Self {
            chunk_width: chunk_size,
            chunk_height: chunk_size,
            seed,
            ..Self::default()
        }
    }

    /// Sets the initial cache rectangle.
    #[must_use]
    pub const fn with_initial_cache(mut self, width: usize, height: usize) -> Self {
        self.initial_width = width;
        self.initial_height = height;
        self
    }

    /// Sets the cache expansion margin.
    #[must_use]
    pub const fn with_expand_margin(mut self, margin: usize) -> Self {
        self.cache_expand_margin = margin;
        self
    }

    /// Checks that the options describe a usable generator.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero-sized chunks or sizes that do
    /// not fit signed chunk arithmetic.
    pub fn validate(&self) -> TerrainResult<()> {
        if self.chunk_width == 0 || self.chunk_height == 0 {
            return Err(TerrainError::InvalidConfiguration(format!(
                "chunk dimensions must be positive, got {}x{}",
                self.chunk_width, self.chunk_height
            )));
        }
        let limit = i32::MAX as usize;
        for (name, value) in [
            ("chunk_width", self.chunk_width),
            ("chunk_height", self.chunk_height),
            ("initial_width", self.initial_width),
            ("initial_height", self.initial_height),
            ("cache_expand_margin", self.cache_expand_margin),
        ] {
            if value > limit {
                return Err(TerrainError::InvalidConfiguration(format!(
                    "{name} = {value} exceeds {limit}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            chunk_width: Self::DEFAULT_CHUNK_SIZE,
            chunk_height: Self::DEFAULT_CHUNK_SIZE,
            seed: 0,
            initial_width: 8,
            initial_height: 8,
            cache_expand_margin: 4,
        }
    }
}
