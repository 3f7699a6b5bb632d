//! # STRATA Procedural Kernels
//!
//! Pure noise functions that turn a chunk coordinate and a seed into a grid.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: every random draw is seeded from `combine_seed` of an
//!    absolute point, so the same point always gets the same draw
//! 2. **Seamless**: lattice, gradient and cellular kernels place chunk `c` at
//!    absolute sample `c * (dimension - 1)`, so abutting chunks share edges
//! 3. **Bounded**: every kernel returns values in `[0, 1]`
//!
//! ## Core Components
//!
//! - `combine_seed`: 3-input integer hash
//! - `LatticeNoise`: diamond-square refinement
//! - `GradientNoise`: Perlin-style gradient noise
//! - `CellularNoise` / `CellEdgeNoise`: Worley distance and ridge noise
//! - `WhiteNoise`: uncorrelated samples
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::ChunkCoord;
//! use strata_procedural::{GradientNoise, NoiseKernel};
//!
//! let noise = GradientNoise::new(32);
//! let grid = noise.generate(ChunkCoord::new(0, 0), 129, 129, 42)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cellular;
pub mod gradient;
pub mod kernel;
pub mod lattice;
pub mod math;
pub mod seed;
pub mod white;

pub use cellular::{CellEdgeNoise, CellularNoise, DistanceMetric};
pub use gradient::GradientNoise;
pub use kernel::NoiseKernel;
pub use lattice::LatticeNoise;
pub use seed::{combine_seed, point_rng, point_unit};
pub use white::WhiteNoise;
