//! # STRATA Terrain Generation
//!
//! Built-in layers, modifiers and blends on top of the core engine, plus the
//! TOML configuration surface that turns a terrain description into a
//! ready-to-query `Generator`.
//!
//! ## Design Principles
//!
//! 1. **Data, not callbacks**: every built-in is a serializable enum variant
//! 2. **Fail at load**: schema and graph errors surface before any chunk is computed
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata::TerrainConfig;
//!
//! let config = TerrainConfig::from_toml_file("crates/strata/data/terrain.toml")?;
//! let generator = config.build_generator()?;
//! let water = generator.feature("water")?.evaluate(0, 0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod blends;
pub mod config;
pub mod layers;
pub mod modifiers;
pub mod summary;

pub use blends::BlendKind;
pub use config::{FeatureConfig, LayerConfig, TerrainConfig};
pub use layers::LayerKind;
pub use modifiers::ModifierKind;
pub use summary::{summarize_region, ChunkSummary};

pub use strata_core::{
    ChunkCoord, Feature, GenerationOptions, Generator, Grid, TerrainError, TerrainResult,
};
