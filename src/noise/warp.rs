//! Iterative domain warping of the sampling grid.
//!
//! Each iteration builds two fractal Perlin fields over the base window,
//! halves them into `[-0.5, 0.5]`, and pushes the X and Y planes by
//! `strength` times those fields. Strength decays by `falloff` after every
//! iteration.

use serde::{Deserialize, Serialize};

use crate::coords::{CoordGrid, SampleWindow};
use crate::error::{Result, TerrainError};
use crate::grid::Field;
use crate::noise::fractal::{fractal, FractalParams};
use crate::noise::perlin::perlin;
use crate::noise::permutation::PermutationTable;
use crate::seeds::SeedMode;

/// Domain warp configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpParams {
    /// Number of warp passes; 0 leaves the grid untouched
    pub warp_count: u32,
    /// Displacement magnitude of the first pass, in lattice units
    pub strength: f64,
    /// Strength multiplier applied after each pass, in [0, 1]
    pub falloff: f64,
    /// Octave stack used for the displacement fields
    pub fractal: FractalParams,
}

impl Default for WarpParams {
    fn default() -> Self {
        Self {
            warp_count: 1,
            strength: 0.5,
            falloff: 0.5,
            fractal: FractalParams::default(),
        }
    }
}

impl WarpParams {
    pub fn validate(&self) -> Result<()> {
        if !self.strength.is_finite() {
            return Err(TerrainError::InvalidWarp(format!(
                "strength must be finite, got {}",
                self.strength
            )));
        }
        if !(0.0..=1.0).contains(&self.falloff) {
            return Err(TerrainError::InvalidWarp(format!(
                "falloff must be in [0, 1], got {}",
                self.falloff
            )));
        }
        self.fractal.validate()
    }
}

/// One displacement field in `[-0.5, 0.5]`.
fn displacement(window: &SampleWindow, fractal_params: &FractalParams, mode: SeedMode) -> Result<Field> {
    let table = PermutationTable::from_mode(mode);
    let mut field = fractal(window, fractal_params, |ow| Ok(perlin(&table, &CoordGrid::linear(ow))))?;
    field.scale(0.5);
    Ok(field)
}

/// Warped coordinate grid for `window`.
///
/// Pass `k` (from 0) seeds its X field with `seed_mode.derive(2k + 1)` and its
/// Y field with `seed_mode.derive(2k + 2)`, so fixed seeds give reproducible
/// warps and time seeding gives fresh ones.
pub fn domain_warp(window: &SampleWindow, params: &WarpParams, seed_mode: SeedMode) -> Result<CoordGrid> {
    window.validate()?;
    params.validate()?;

    let mut coords = CoordGrid::linear(window);
    let mut strength = params.strength;

    for pass in 0..params.warp_count {
        let warp_x = displacement(window, &params.fractal, seed_mode.derive(2 * pass + 1))?;
        let warp_y = displacement(window, &params.fractal, seed_mode.derive(2 * pass + 2))?;
        tracing::trace!(pass, strength, "domain warp pass");

        coords.displace(&warp_x, strength, &warp_y, strength)?;
        strength *= params.falloff;
    }

    Ok(coords)
}
