//! # Terrain Configuration
//!
//! A TOML description of a generator: one `[generation]` table plus one
//! `[[features]]` entry per feature.
//!
//! ```toml
//! [generation]
//! chunk_width = 65
//! chunk_height = 65
//! seed = 1337
//!
//! [[features]]
//! name = "elevation"
//! modifiers = [{ kind = "terrain_ease" }]
//!
//! [[features.layers]]
//! name = "continent"
//! compute = { kind = "lattice", smoothness = 1.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{
    FeatureSpec, GenerationOptions, Generator, LayerSpec, TerrainError, TerrainResult,
};

use crate::blends::BlendKind;
use crate::layers::LayerKind;
use crate::modifiers::ModifierKind;

/// One layer of a feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Name, unique within the feature.
    pub name: String,
    /// What the layer computes.
    pub compute: LayerKind,
    /// Layers of the same feature this layer reads.
    #[serde(default)]
    pub layer_dependencies: Vec<String>,
    /// Other features this layer reads.
    #[serde(default)]
    pub feature_dependencies: Vec<String>,
}

impl LayerConfig {
    /// Creates a layer with no dependencies.
    pub fn new(name: impl Into<String>, compute: LayerKind) -> Self {
        Self {
            name: name.into(),
            compute,
            layer_dependencies: Vec::new(),
            feature_dependencies: Vec::new(),
        }
    }

    /// Converts into the engine's layer spec.
    #[must_use]
    pub fn to_spec(&self) -> LayerSpec {
        let mut spec = LayerSpec::new(self.name.clone(), std::sync::Arc::new(self.compute.clone()));
        spec.layer_dependencies.clone_from(&self.layer_dependencies);
        spec.feature_dependencies.clone_from(&self.feature_dependencies);
        spec
    }
}

/// One feature: layers folded through modifiers and blends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Name, unique within the generator.
    pub name: String,
    /// Layers in fold order.
    pub layers: Vec<LayerConfig>,
    /// One modifier per layer.
    #[serde(default)]
    pub modifiers: Vec<ModifierKind>,
    /// One blend per layer after the first.
    #[serde(default)]
    pub blends: Vec<BlendKind>,
}

impl FeatureConfig {
    /// Converts into the engine's feature spec. Counts are checked when the
    /// generator is built.
    #[must_use]
    pub fn to_spec(&self) -> FeatureSpec {
        let mut spec = FeatureSpec::new(self.name.clone());
        for layer in &self.layers {
            spec = spec.with_layer(layer.to_spec());
        }
        for &modifier in &self.modifiers {
            spec = spec.with_modifier(modifier);
        }
        for &blend in &self.blends {
            spec = spec.with_blend(blend);
        }
        spec
    }
}

/// A complete terrain description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Chunk size, seed and cache sizing.
    #[serde(default)]
    pub generation: GenerationOptions,
    /// Features, in declaration order.
    #[serde(default)]
    pub features: Vec<FeatureConfig>,
}

impl TerrainConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` describing the first syntax or schema error.
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        toml::from_str(source).map_err(|e| TerrainError::InvalidConfiguration(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            TerrainError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            "loaded terrain config {} ({} features)",
            path.display(),
            config.features.len()
        );
        Ok(config)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if a value has no TOML representation.
    pub fn to_toml_string(&self) -> TerrainResult<String> {
        toml::to_string(self).map_err(|e| TerrainError::InvalidConfiguration(e.to_string()))
    }

    /// Looks up a feature by name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&FeatureConfig> {
        self.features.iter().find(|feature| feature.name == name)
    }

    /// Engine specs for every feature, in declaration order.
    #[must_use]
    pub fn feature_specs(&self) -> Vec<FeatureSpec> {
        self.features.iter().map(FeatureConfig::to_spec).collect()
    }

    /// Builds a generator from this description.
    ///
    /// # Errors
    ///
    /// Any construction error from [`Generator::new`].
    pub fn build_generator(&self) -> TerrainResult<Generator> {
        Generator::new(self.generation, self.feature_specs())
    }
}
