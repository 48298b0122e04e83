//! Fractal Brownian motion: several octaves of one kernel summed together.
//!
//! Octave `k` samples at frequency `lacunarity^k` with amplitude
//! `persistence^k`; the sum is divided by the total amplitude so a kernel
//! bounded by `[-1, 1]` stays bounded by `[-1, 1]`.

use serde::{Deserialize, Serialize};

use crate::coords::SampleWindow;
use crate::error::{Result, TerrainError};
use crate::grid::{Field, Grid};

/// Octave stack configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalParams {
    /// Number of noise layers to sum (>= 1)
    pub octaves: u32,
    /// Amplitude multiplier per octave, in (0, 1]
    pub persistence: f64,
    /// Frequency multiplier per octave (>= 1)
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl FractalParams {
    pub fn validate(&self) -> Result<()> {
        if self.octaves < 1 {
            return Err(TerrainError::OctaveParameterOutOfRange(format!(
                "octaves must be at least 1, got {}",
                self.octaves
            )));
        }
        if !(self.persistence.is_finite() && self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(TerrainError::OctaveParameterOutOfRange(format!(
                "persistence must be in (0, 1], got {}",
                self.persistence
            )));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity >= 1.0) {
            return Err(TerrainError::OctaveParameterOutOfRange(format!(
                "lacunarity must be at least 1, got {}",
                self.lacunarity
            )));
        }
        Ok(())
    }

    /// Sum of all octave amplitudes.
    pub fn total_amplitude(&self) -> f64 {
        (0..self.octaves).map(|k| self.persistence.powi(k as i32)).sum()
    }
}

/// Sum octaves of `noise_fn` over `window`.
///
/// `noise_fn` is called once per octave with that octave's window and must
/// return a field of `window.shape`. Parameters are validated before the
/// first call.
pub fn fractal<F>(window: &SampleWindow, params: &FractalParams, mut noise_fn: F) -> Result<Field>
where
    F: FnMut(&SampleWindow) -> Result<Field>,
{
    window.validate()?;
    params.validate()?;

    let mut sum: Field = Grid::new_with(window.shape, 0.0);
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_amplitude = 0.0;

    for octave in 0..params.octaves {
        let octave_window = window.octave(frequency);
        tracing::trace!(octave, frequency, amplitude, scale = octave_window.scale, "fractal octave");

        let layer = noise_fn(&octave_window)?;
        sum.add_scaled(&layer, amplitude)?;

        max_amplitude += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    sum.scale(1.0 / max_amplitude);
    Ok(sum)
}
