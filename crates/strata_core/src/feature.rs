//! # Features
//!
//! A feature folds the outputs of its layers into one grid per chunk:
//!
//! ```text
//! acc = modifier[0](layer[0][x, y])
//! acc = blend[i - 1](acc, modifier[i](layer[i][x, y]))   for i in 1..n
//! ```
//!
//! Layers are built in a layer-local dependency order, but folded in the
//! order they were declared.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cache::{CacheBounds, SyncChunkCache};
use crate::error::{TerrainError, TerrainResult};
use crate::grid::{ChunkCoord, Grid};
use crate::layer::{Layer, LayerSpec};
use crate::options::GenerationOptions;
use crate::resolver::DependencyResolver;

/// Transforms one layer's output before it is blended.
pub trait Modifier: Send + Sync {
    /// Returns the modified grid. Must preserve dimensions.
    fn modify(&self, grid: Grid) -> Grid;
}

impl<F> Modifier for F
where
    F: Fn(Grid) -> Grid + Send + Sync,
{
    fn modify(&self, grid: Grid) -> Grid {
        self(grid)
    }
}

/// Combines the running result with the next modified layer.
pub trait Blend: Send + Sync {
    /// Returns the combined grid.
    ///
    /// # Errors
    ///
    /// Implementations typically fail with `DimensionMismatch` when the two
    /// grids differ in size.
    fn blend(&self, accumulated: Grid, next: Grid) -> TerrainResult<Grid>;
}

impl<F> Blend for F
where
    F: Fn(Grid, Grid) -> TerrainResult<Grid> + Send + Sync,
{
    fn blend(&self, accumulated: Grid, next: Grid) -> TerrainResult<Grid> {
        self(accumulated, next)
    }
}

/// Declarative description of one feature.
#[derive(Clone)]
pub struct FeatureSpec {
    /// Name, unique within a generator.
    pub name: String,
    /// Layers in fold order.
    pub layers: Vec<LayerSpec>,
    /// One modifier per layer.
    pub modifiers: Vec<Arc<dyn Modifier>>,
    /// One blend per layer after the first.
    pub blends: Vec<Arc<dyn Blend>>,
}

impl FeatureSpec {
    /// Creates an empty spec.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
            modifiers: Vec::new(),
            blends: Vec::new(),
        }
    }

    /// Appends a layer.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerSpec) -> Self {
        self.layers.push(layer);
        self
    }

    /// Appends a modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: impl Modifier + 'static) -> Self {
        self.modifiers.push(Arc::new(modifier));
        self
    }

    /// Appends a blend.
    #[must_use]
    pub fn with_blend(mut self, blend: impl Blend + 'static) -> Self {
        self.blends.push(Arc::new(blend));
        self
    }

    /// Names of every feature this spec's layers read, deduplicated, in
    /// declaration order.
    #[must_use]
    pub fn feature_dependencies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for layer in &self.layers {
            for name in &layer.feature_dependencies {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn validate_counts(&self) -> TerrainResult<()> {
        if self.layers.is_empty() {
            return Err(TerrainError::InvalidConfiguration(format!(
                "feature '{}' has no layers",
                self.name
            )));
        }
        if self.modifiers.len() != self.layers.len() {
            return Err(TerrainError::InvalidConfiguration(format!(
                "feature '{}' has {} layers but {} modifiers",
                self.name,
                self.layers.len(),
                self.modifiers.len()
            )));
        }
        if self.blends.len() + 1 != self.layers.len() {
            return Err(TerrainError::InvalidConfiguration(format!(
                "feature '{}' has {} layers but {} blends (expected {})",
                self.name,
                self.layers.len(),
                self.blends.len(),
                self.layers.len() - 1
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for FeatureSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSpec")
            .field("name", &self.name)
            .field("layers", &self.layers)
            .field("modifiers", &self.modifiers.len())
            .field("blends", &self.blends.len())
            .finish()
    }
}

/// A constructed, cached feature.
pub struct Feature {
    name: String,
    options: GenerationOptions,
    layers: Vec<Arc<Layer>>,
    modifiers: Vec<Arc<dyn Modifier>>,
    blends: Vec<Arc<dyn Blend>>,
    cache: SyncChunkCache,
}

impl Feature {
    /// Builds a feature and its layers.
    ///
    /// `features` must contain every feature the spec's layers read; extra
    /// entries are ignored.
    ///
    /// # Errors
    ///
    /// * `InvalidConfiguration` if there are no layers or the modifier or
    ///   blend counts do not match the layer count.
    /// * `DuplicateName` if two layers share a name.
    /// * `UnknownDependency` if a layer names a layer or feature that does not exist.
    /// * `CircularDependency` if layers depend on each other in a cycle.
    pub fn new(
        spec: FeatureSpec,
        options: GenerationOptions,
        features: &HashMap<String, Arc<Feature>>,
    ) -> TerrainResult<Self> {
        spec.validate_counts()?;

        let mut resolver = DependencyResolver::new();
        for layer in &spec.layers {
            if resolver.contains(&layer.name) {
                return Err(TerrainError::DuplicateName(format!(
                    "{}.{}",
                    spec.name, layer.name
                )));
            }
            resolver.add_item(&layer.name);
        }

        for layer in &spec.layers {
            for dependency in &layer.layer_dependencies {
                if !resolver.contains(dependency) {
                    return Err(TerrainError::UnknownDependency {
                        dependent: format!("{}.{}", spec.name, layer.name),
                        dependency: dependency.clone(),
                    });
                }
                resolver.add_dependency(&layer.name, dependency)?;
            }
            if let Some(missing) = layer
                .feature_dependencies
                .iter()
                .find(|name| !features.contains_key(name.as_str()))
            {
                return Err(TerrainError::UnknownDependency {
                    dependent: format!("{}.{}", spec.name, layer.name),
                    dependency: missing.clone(),
                });
            }
        }

        let order = resolver.solve()?;
        tracing::debug!("feature '{}' layer build order: {:?}", spec.name, order);

        let mut built: HashMap<String, Arc<Layer>> = HashMap::with_capacity(order.len());
        for name in &order {
            let Some(layer) = spec.layers.iter().find(|layer| &layer.name == name) else {
                return Err(TerrainError::UnknownLayer(name.clone()));
            };
            let feature_deps = layer
                .feature_dependencies
                .iter()
                .filter_map(|dependency| features.get(dependency).cloned())
                .collect();
            let layer_deps = layer
                .layer_dependencies
                .iter()
                .filter_map(|dependency| built.get(dependency).cloned())
                .collect();
            let constructed = Layer::new(
                name.clone(),
                Arc::clone(&layer.compute),
                options,
                feature_deps,
                layer_deps,
            );
            built.insert(name.clone(), Arc::new(constructed));
        }

        let mut layers = Vec::with_capacity(spec.layers.len());
        for layer in &spec.layers {
            match built.remove(&layer.name) {
                Some(constructed) => layers.push(constructed),
                None => return Err(TerrainError::UnknownLayer(layer.name.clone())),
            }
        }

        Ok(Self {
            name: spec.name,
            options,
            layers,
            modifiers: spec.modifiers,
            blends: spec.blends,
            cache: SyncChunkCache::from_options(&options),
        })
    }

    /// Feature name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options this feature was built with.
    #[must_use]
    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Layers in fold order.
    #[must_use]
    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    /// Looks up one of this feature's layers.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLayer` if no layer has that name.
    pub fn layer(&self, name: &str) -> TerrainResult<&Arc<Layer>> {
        self.layers
            .iter()
            .find(|layer| layer.name() == name)
            .ok_or_else(|| TerrainError::UnknownLayer(format!("{}.{name}", self.name)))
    }

    /// Current feature-level cache bounds.
    #[must_use]
    pub fn cache_bounds(&self) -> CacheBounds {
        self.cache.bounds()
    }

    /// Number of chunks cached at the feature level.
    #[must_use]
    pub fn cached_chunks(&self) -> usize {
        self.cache.len()
    }

    /// Returns the folded grid for chunk `(x, y)`, computing and caching it
    /// on first use.
    ///
    /// # Errors
    ///
    /// Propagates layer and blend errors. Returns `DimensionMismatch` if a
    /// modifier or blend changed the grid size.
    pub fn evaluate(&self, x: i32, y: i32) -> TerrainResult<Grid> {
        let coord = ChunkCoord::new(x, y);
        self.cache.get_or_compute(coord, || self.fold(coord))
    }

    fn fold(&self, coord: ChunkCoord) -> TerrainResult<Grid> {
        let (width, height) = (self.options.chunk_width, self.options.chunk_height);

        let first = self.layers[0].evaluate(coord.x, coord.y)?;
        let mut accumulated = self.modifiers[0].modify(first);
        accumulated.ensure_dimensions(width, height)?;

        for (index, layer) in self.layers.iter().enumerate().skip(1) {
            let next = self.modifiers[index].modify(layer.evaluate(coord.x, coord.y)?);
            next.ensure_dimensions(width, height)?;
            accumulated = self.blends[index - 1].blend(accumulated, next)?;
            accumulated.ensure_dimensions(width, height)?;
        }

        Ok(accumulated)
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name)
            .field("layers", &self.layers)
            .field("cache_bounds", &self.cache.bounds())
            .finish_non_exhaustive()
    }
}
