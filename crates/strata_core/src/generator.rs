//! # Generator
//!
//! Top-level registry. Builds every feature in dependency order and hands
//! each one only the features it reads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{TerrainError, TerrainResult};
use crate::feature::{Feature, FeatureSpec};
use crate::grid::Grid;
use crate::options::GenerationOptions;
use crate::resolver::DependencyResolver;

/// Owns every feature of one terrain description.
#[derive(Debug)]
pub struct Generator {
    options: GenerationOptions,
    /// Features in declaration order.
    features: Vec<Arc<Feature>>,
    index: HashMap<String, usize>,
    build_order: Vec<String>,
}

impl Generator {
    /// Validates the options, resolves the feature graph and builds every feature.
    ///
    /// # Errors
    ///
    /// * `InvalidConfiguration` for bad options or malformed feature specs.
    /// * `DuplicateName` if two features (or two layers of one feature) share a name.
    /// * `UnknownDependency` if a layer reads a feature or layer that does not exist.
    /// * `CircularDependency` if features or layers depend on each other in a cycle.
    pub fn new(options: GenerationOptions, specs: Vec<FeatureSpec>) -> TerrainResult<Self> {
        options.validate()?;

        let mut resolver = DependencyResolver::new();
        for spec in &specs {
            if resolver.contains(&spec.name) {
                return Err(TerrainError::DuplicateName(spec.name.clone()));
            }
            resolver.add_item(&spec.name);
        }

        for spec in &specs {
            for dependency in spec.feature_dependencies() {
                if !resolver.contains(dependency) {
                    return Err(TerrainError::UnknownDependency {
                        dependent: spec.name.clone(),
                        dependency: dependency.to_owned(),
                    });
                }
                resolver.add_dependency(&spec.name, dependency)?;
            }
        }

        let build_order = resolver.solve()?;
        tracing::debug!("feature build order: {:?}", build_order);

        let names: Vec<String> = specs.iter().map(|spec| spec.name.clone()).collect();
        let mut pending: HashMap<String, FeatureSpec> = specs
            .into_iter()
            .map(|spec| (spec.name.clone(), spec))
            .collect();
        let mut built: HashMap<String, Arc<Feature>> = HashMap::with_capacity(names.len());

        for name in &build_order {
            let spec = pending
                .remove(name)
                .ok_or_else(|| TerrainError::UnknownFeature(name.clone()))?;
            let dependencies: HashMap<String, Arc<Feature>> = spec
                .feature_dependencies()
                .into_iter()
                .filter_map(|dependency| {
                    built
                        .get(dependency)
                        .map(|feature| (dependency.to_owned(), Arc::clone(feature)))
                })
                .collect();
            let feature = Feature::new(spec, options, &dependencies)?;
            built.insert(name.clone(), Arc::new(feature));
        }

        let mut features = Vec::with_capacity(names.len());
        let mut index = HashMap::with_capacity(names.len());
        for name in names {
            let feature = built
                .remove(&name)
                .ok_or_else(|| TerrainError::UnknownFeature(name.clone()))?;
            index.insert(name, features.len());
            features.push(feature);
        }

        tracing::info!(
            "generator ready: {} features, {}x{} chunks, seed {}",
            features.len(),
            options.chunk_width,
            options.chunk_height,
            options.seed
        );

        Ok(Self {
            options,
            features,
            index,
            build_order,
        })
    }

    /// Options shared by every feature.
    #[must_use]
    pub const fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// Looks up a feature by name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` if no feature has that name.
    pub fn feature(&self, name: &str) -> TerrainResult<&Arc<Feature>> {
        self.index
            .get(name)
            .map(|&i| &self.features[i])
            .ok_or_else(|| TerrainError::UnknownFeature(name.to_owned()))
    }

    /// Features in declaration order.
    #[must_use]
    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    /// Order in which features were built.
    #[must_use]
    pub fn build_order(&self) -> &[String] {
        &self.build_order
    }

    /// Shorthand for `feature(name)?.evaluate(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or any evaluation error.
    pub fn evaluate(&self, name: &str, x: i32, y: i32) -> TerrainResult<Grid> {
        self.feature(name)?.evaluate(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerSpec;

    fn options() -> GenerationOptions {
        GenerationOptions::new(5, 17).with_initial_cache(2, 2).with_expand_margin(2)
    }

    fn single(name: &str, layer: LayerSpec) -> FeatureSpec {
        FeatureSpec::new(name)
            .with_layer(layer)
            .with_modifier(|grid: Grid| grid)
    }

    fn seeded(name: &str) -> FeatureSpec {
        single(
            name,
            LayerSpec::from_fn("noise", |ctx| {
                Ok(Grid::from_fn(ctx.width, ctx.height, |x, y| {
                    ((x as i32 + ctx.x() * 7) ^ (y as i32 + ctx.y() * 13) ^ ctx.seed) as f32
                }))
            }),
        )
    }

    fn copy_of(name: &str, source: &str) -> FeatureSpec {
        single(
            name,
            LayerSpec::from_fn("copy", |ctx| ctx.features[0].evaluate(ctx.x(), ctx.y()))
                .with_features([source]),
        )
    }

    #[test]
    fn test_derived_feature_copies_base() {
        // Declared before its dependency on purpose.
        let generator =
            Generator::new(options(), vec![copy_of("derived", "base"), seeded("base")]).unwrap();

        assert_eq!(generator.build_order(), ["base", "derived"]);
        assert_eq!(generator.features()[0].name(), "derived");
        assert_eq!(
            generator.evaluate("derived", 0, 0).unwrap(),
            generator.evaluate("base", 0, 0).unwrap()
        );
    }

    #[test]
    fn test_duplicate_feature() {
        let err = Generator::new(options(), vec![seeded("a"), seeded("a")]).unwrap_err();
        assert_eq!(err, TerrainError::DuplicateName("a".into()));
    }

    #[test]
    fn test_unknown_feature_dependency() {
        let err = Generator::new(options(), vec![copy_of("derived", "missing")]).unwrap_err();
        assert_eq!(
            err,
            TerrainError::UnknownDependency {
                dependent: "derived".into(),
                dependency: "missing".into(),
            }
        );
    }

    #[test]
    fn test_feature_cycle() {
        let err = Generator::new(options(), vec![copy_of("a", "b"), copy_of("b", "a")]).unwrap_err();
        assert!(matches!(err, TerrainError::CircularDependency { .. }));
    }

    #[test]
    fn test_unknown_feature_lookup() {
        let generator = Generator::new(options(), vec![seeded("base")]).unwrap();
        assert_eq!(
            generator.feature("nope").unwrap_err(),
            TerrainError::UnknownFeature("nope".into())
        );
        assert!(generator.evaluate("nope", 0, 0).is_err());
    }

    #[test]
    fn test_invalid_options() {
        let err = Generator::new(GenerationOptions::new(0, 1), vec![seeded("base")]).unwrap_err();
        assert!(matches!(err, TerrainError::InvalidConfiguration(_)));
    }
}
