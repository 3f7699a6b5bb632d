//! White noise: one random stream per chunk, no spatial correlation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use strata_core::{ChunkCoord, Grid, TerrainResult};

use crate::kernel::NoiseKernel;
use crate::seed::point_rng;

/// Uniform samples in `[0, 1)`, seeded by the chunk coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteNoise {
    /// Added to the generator seed so layers can decorrelate.
    pub seed_offset: i32,
}

impl NoiseKernel for WhiteNoise {
    fn generate(
        &self,
        coord: ChunkCoord,
        width: usize,
        height: usize,
        seed: i32,
    ) -> TerrainResult<Grid> {
        let mut rng = point_rng(coord.x, coord.y, seed.wrapping_add(self.seed_offset));
        let mut grid = Grid::new(width, height);
        // Column-major draw order.
        for x in 0..width {
            for y in 0..height {
                grid.set(x, y, rng.gen::<f32>());
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_order() {
        let grid = WhiteNoise::default()
            .generate(ChunkCoord::new(4, 5), 3, 2, 6)
            .unwrap();

        let mut rng = point_rng(4, 5, 6);
        let first: f32 = rng.gen();
        let second: f32 = rng.gen();
        assert_eq!(grid.get(0, 0), first);
        assert_eq!(grid.get(0, 1), second);
    }

    #[test]
    fn test_chunks_differ() {
        let noise = WhiteNoise { seed_offset: 3 };
        let a = noise.generate(ChunkCoord::new(0, 0), 8, 8, 1).unwrap();
        let b = noise.generate(ChunkCoord::new(1, 0), 8, 8, 1).unwrap();
        assert_ne!(a, b);
        assert!(a.samples().iter().all(|v| (0.0..1.0).contains(v)));
    }
}
