//! The kernel interface every noise generator implements.

use strata_core::{ChunkCoord, Grid, TerrainResult};

/// A pure function from chunk coordinate and seed to a chunk-sized grid.
pub trait NoiseKernel {
    /// Generates the `width` x `height` grid for `coord`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for unusable parameters and
    /// `InvalidDimension` for chunk sizes the kernel cannot handle.
    fn generate(&self, coord: ChunkCoord, width: usize, height: usize, seed: i32)
        -> TerrainResult<Grid>;
}
