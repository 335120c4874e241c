//! Forest Fire Simulation Core Library
//!
//! A tile-partitioned cellular automaton for wildfire spread across open terrain.
//! Each tile holds a grid of single-byte cells (empty, living tree, burning,
//! burned). Fire spreads through wind-weighted neighbour influence, including
//! across tile edges, and a round-robin scheduler ticks only a few tile rows per
//! frame to keep per-frame cost bounded.
//!
//! ## Layout
//!
//! - [`cell`]: state byte ranges and decoding
//! - [`wind`]: 3×3 neighbour weights from wind speed and bearing
//! - [`tile`]: the per-tile automaton and edit operations
//! - [`scheduler`]: amortized row scheduling
//! - [`forest`]: the tile arena, world addressing and lifecycle
//! - [`terrain`], [`noise`]: density and height collaborators
//! - [`hash`]: stable per-cell visual variants
//!
//! Rendering, particles and input handling live outside this crate. They read
//! cell state, drain [`CellBurned`] events and call the edit operations.

pub mod cell;
pub mod config;
pub mod error;
pub mod forest;
pub mod hash;
pub mod noise;
pub mod sampling;
pub mod scheduler;
pub mod terrain;
pub mod tile;
pub mod wind;

pub use cell::{Cell, CellCensus, CellKind, ALIVE, BURNED, EMPTY, FIRE};
pub use config::ForestConfig;
pub use error::{ConfigError, ForestError, ForestResult};
pub use forest::{CellBurned, Forest, StepReport};
pub use hash::VariantHash;
pub use sampling::{RngSource, SequenceSource, UniformSource};
pub use scheduler::RowScheduler;
pub use terrain::{DensityField, FlatTerrain, HeightField, HeightMap, NoiseDensity, UniformDensity};
pub use tile::{ForestTile, Isolated, LocalCell, Siblings, SpreadRates, TileCoord};
pub use wind::{WindMatrix, WindModel};
