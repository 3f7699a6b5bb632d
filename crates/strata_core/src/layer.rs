//! # Layers
//!
//! A layer is one named compute function plus the layers and features it reads.
//! Each layer owns a chunk cache, so a chunk is computed at most once no matter
//! how many features or other layers read it.

use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheBounds, SyncChunkCache};
use crate::error::{TerrainError, TerrainResult};
use crate::feature::Feature;
use crate::grid::{ChunkCoord, Grid};
use crate::options::GenerationOptions;

/// Everything a compute function may look at for one chunk.
#[derive(Clone, Copy)]
pub struct ComputeContext<'a> {
    /// The chunk being computed.
    pub coord: ChunkCoord,
    /// Chunk width in samples.
    pub width: usize,
    /// Chunk height in samples.
    pub height: usize,
    /// Generator seed.
    pub seed: i32,
    /// Feature dependencies, in declaration order.
    pub features: &'a [Arc<Feature>],
    /// Layer dependencies, in declaration order.
    pub layers: &'a [Arc<Layer>],
}

impl ComputeContext<'_> {
    /// Chunk X coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.coord.x
    }

    /// Chunk Y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.coord.y
    }

    /// A zero-filled chunk-sized grid.
    #[must_use]
    pub fn blank(&self) -> Grid {
        Grid::new(self.width, self.height)
    }
}

impl fmt::Debug for ComputeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeContext")
            .field("coord", &self.coord)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("seed", &self.seed)
            .field("features", &self.features.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("layers", &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Produces one chunk-sized grid.
///
/// Implementations must be pure given the seed and their dependencies' outputs:
/// the same chunk always yields the same grid.
pub trait LayerCompute: Send + Sync {
    /// Computes the grid for `ctx.coord`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the error is returned to whoever queried the chunk.
    fn compute(&self, ctx: &ComputeContext<'_>) -> TerrainResult<Grid>;
}

impl<F> LayerCompute for F
where
    F: Fn(&ComputeContext<'_>) -> TerrainResult<Grid> + Send + Sync,
{
    fn compute(&self, ctx: &ComputeContext<'_>) -> TerrainResult<Grid> {
        self(ctx)
    }
}

/// Boxes a closure as a shareable compute function.
pub fn compute_fn<F>(f: F) -> Arc<dyn LayerCompute>
where
    F: Fn(&ComputeContext<'_>) -> TerrainResult<Grid> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Declarative description of one layer.
#[derive(Clone)]
pub struct LayerSpec {
    /// Name, unique within its feature.
    pub name: String,
    /// The compute function.
    pub compute: Arc<dyn LayerCompute>,
    /// Layers of the same feature this layer reads.
    pub layer_dependencies: Vec<String>,
    /// Other features this layer reads.
    pub feature_dependencies: Vec<String>,
}

impl LayerSpec {
    /// Creates a spec with no dependencies.
    pub fn new(name: impl Into<String>, compute: Arc<dyn LayerCompute>) -> Self {
        Self {
            name: name.into(),
            compute,
            layer_dependencies: Vec::new(),
            feature_dependencies: Vec::new(),
        }
    }

    /// Creates a spec from a closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ComputeContext<'_>) -> TerrainResult<Grid> + Send + Sync + 'static,
    {
        Self::new(name, compute_fn(f))
    }

    /// Adds layer dependencies (same feature).
    #[must_use]
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_dependencies.extend(layers.into_iter().map(Into::into));
        self
    }

    /// Adds feature dependencies.
    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_dependencies.extend(features.into_iter().map(Into::into));
        self
    }
}

impl fmt::Debug for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerSpec")
            .field("name", &self.name)
            .field("layer_dependencies", &self.layer_dependencies)
            .field("feature_dependencies", &self.feature_dependencies)
            .finish_non_exhaustive()
    }
}

/// A constructed, cached layer.
pub struct Layer {
    name: String,
    compute: Arc<dyn LayerCompute>,
    options: GenerationOptions,
    features: Vec<Arc<Feature>>,
    layers: Vec<Arc<Layer>>,
    cache: SyncChunkCache,
}

impl Layer {
    /// Builds a layer over already-constructed dependencies.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        compute: Arc<dyn LayerCompute>,
        options: GenerationOptions,
        features: Vec<Arc<Feature>>,
        layers: Vec<Arc<Layer>>,
    ) -> Self {
        Self {
            name: name.into(),
            compute,
            cache: SyncChunkCache::from_options(&options),
            options,
            features,
            layers,
        }
    }

    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Feature dependencies, in declaration order.
    #[must_use]
    pub fn feature_dependencies(&self) -> &[Arc<Feature>] {
        &self.features
    }

    /// Layer dependencies, in declaration order.
    #[must_use]
    pub fn layer_dependencies(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    /// Current cache bounds.
    #[must_use]
    pub fn cache_bounds(&self) -> CacheBounds {
        self.cache.bounds()
    }

    /// Number of chunks computed and cached so far.
    #[must_use]
    pub fn cached_chunks(&self) -> usize {
        self.cache.len()
    }

    /// Returns the grid for chunk `(x, y)`, computing and caching it on first use.
    ///
    /// # Errors
    ///
    /// Propagates compute and dependency errors. Returns `DimensionMismatch` if
    /// the compute function yields a grid that is not chunk-sized, and
    /// `ChunkOutOfRange` if the cache cannot grow to cover `(x, y)`.
    pub fn evaluate(&self, x: i32, y: i32) -> TerrainResult<Grid> {
        let coord = ChunkCoord::new(x, y);
        self.cache.get_or_compute(coord, || {
            tracing::trace!("layer '{}' computing chunk {}", self.name, coord);
            let ctx = ComputeContext {
                coord,
                width: self.options.chunk_width,
                height: self.options.chunk_height,
                seed: self.options.seed,
                features: &self.features,
                layers: &self.layers,
            };
            let grid = self.compute.compute(&ctx)?;
            grid.ensure_dimensions(ctx.width, ctx.height)?;
            Ok(grid)
        })
    }

    /// Looks up a layer dependency by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLayer` if this layer does not depend on `name`.
    pub fn dependency(&self, name: &str) -> TerrainResult<&Arc<Layer>> {
        self.layers
            .iter()
            .find(|layer| layer.name() == name)
            .ok_or_else(|| TerrainError::UnknownLayer(name.to_owned()))
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("features", &self.features.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("layers", &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>())
            .field("cache_bounds", &self.cache.bounds())
            .finish_non_exhaustive()
    }
}
