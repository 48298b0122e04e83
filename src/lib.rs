//! Procedural height-field terrain from layered gradient noise
//!
//! Re-exports modules for use by binaries and tools.
//!
//! Fields are row-major: index `[row][col]` is the sample at noise-space
//! `(x = col, y = row)` of the sampling window, and `Grid::get(x, y)` takes
//! the column first.

pub mod coords;
pub mod erosion;
pub mod error;
pub mod export;
pub mod grid;
pub mod heightmap;
pub mod noise;
pub mod seeds;

pub use coords::{CoordGrid, SampleWindow};
pub use error::{Result, TerrainError};
pub use grid::{Field, Grid, Shape};
pub use heightmap::{Terrain, TerrainConfig, TerrainPreset};
pub use noise::{Noise, NoiseKind};
pub use seeds::SeedMode;
