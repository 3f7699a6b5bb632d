//! Per-chunk statistics over a square region, as printed by `strata-sample`.

use std::fmt;

use strata_core::{ChunkCoord, Generator, TerrainError, TerrainResult};

/// Min, mean and max of one evaluated chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkSummary {
    /// The chunk.
    pub coord: ChunkCoord,
    /// Smallest sample.
    pub min: f32,
    /// Mean sample.
    pub mean: f32,
    /// Largest sample.
    pub max: f32,
}

impl fmt::Display for ChunkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10}  min {:>8.4}  mean {:>8.4}  max {:>8.4}",
            self.coord.to_string(),
            self.min,
            self.mean,
            self.max
        )
    }
}

/// Evaluates `feature` for every chunk within `radius` of `center`, row by row.
///
/// # Errors
///
/// Returns `UnknownFeature`, any evaluation error, or `InvalidConfiguration`
/// if the chunks are empty.
pub fn summarize_region(
    generator: &Generator,
    feature: &str,
    center: ChunkCoord,
    radius: u32,
) -> TerrainResult<Vec<ChunkSummary>> {
    let feature = generator.feature(feature)?;
    let radius = radius as i32;
    let mut summaries = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let coord = center.offset(dx, dy);
            let grid = feature.evaluate(coord.x, coord.y)?;
            let empty = || TerrainError::InvalidConfiguration("chunks have no samples".into());
            summaries.push(ChunkSummary {
                coord,
                min: grid.min().ok_or_else(empty)?,
                mean: grid.mean().ok_or_else(empty)?,
                max: grid.max().ok_or_else(empty)?,
            });
        }
    }

    Ok(summaries)
}
