//! # STRATA Core Engine
//!
//! Graph-scheduled, chunk-cached evaluation of terrain layers.
//!
//! ## Design Principles
//!
//! 1. **Ordered**: layers and features are built in dependency order, cycles are rejected
//! 2. **Cached**: every layer and feature computes a chunk at most once
//! 3. **Owned results**: callers receive copies, never views into a cache
//! 4. **Shareable**: a `Generator` is `Send + Sync`, concurrent requests for the
//!    same chunk collapse into one computation
//!
//! ## Core Components
//!
//! - `DependencyResolver`: Kahn ordering over named items
//! - `ChunkCache`: growable sparse 2D array of grids
//! - `Layer`: one compute function plus its declared dependencies
//! - `Feature`: ordered layers folded through modifiers and blends
//! - `Generator`: the feature registry clients query
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{Generator, GenerationOptions};
//!
//! let generator = Generator::new(GenerationOptions::default(), feature_specs)?;
//! let elevation = generator.feature("elevation")?.evaluate(0, 0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod error;
pub mod feature;
pub mod generator;
pub mod grid;
pub mod layer;
pub mod options;
pub mod resolver;

pub use cache::{CacheBounds, ChunkCache, SyncChunkCache, MAX_CACHE_SLOTS};
pub use error::{TerrainError, TerrainResult};
pub use feature::{Blend, Feature, FeatureSpec, Modifier};
pub use generator::Generator;
pub use grid::{ChunkCoord, Grid};
pub use layer::{compute_fn, ComputeContext, Layer, LayerCompute, LayerSpec};
pub use options::GenerationOptions;
pub use resolver::DependencyResolver;
