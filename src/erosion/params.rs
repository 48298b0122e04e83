//! Erosion filter parameters

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Number of gradient passes per erosion call
pub const EROSION_OCTAVES: u32 = 4;

/// Amplitude decay between passes
pub const EROSION_PERSISTENCE: f64 = 0.5;

/// Erosion filter parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Weight of the squared gradient magnitude removed per pass.
    /// 0 disables carving; only the final normalization applies.
    pub erosion_factor: f64,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self { erosion_factor: 0.8 }
    }
}

impl ErosionParams {
    pub fn new(erosion_factor: f64) -> Result<Self> {
        let params = Self { erosion_factor };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.erosion_factor.is_finite() && self.erosion_factor >= 0.0 {
            Ok(())
        } else {
            Err(TerrainError::InvalidErosion(self.erosion_factor))
        }
    }

    /// Sum of pass amplitudes the eroded field is divided by.
    pub fn total_amplitude() -> f64 {
        (0..EROSION_OCTAVES)
            .map(|k| EROSION_PERSISTENCE.powi(k as i32))
            .sum()
    }
}
