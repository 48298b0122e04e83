//! Pointwise shaping of a base noise field.
//!
//! - **Ridge**: sharp crests where the base crosses zero, re-centered on zero
//! - **Billow**: puffy, always non-negative bumps

use crate::error::{Result, TerrainError};
use crate::grid::Field;

fn check_exponent(p: f64) -> Result<()> {
    if p.is_finite() && p > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::InvalidShaping(p))
    }
}

/// `(1 - |v|)^sharpness`, shifted so the realized range is centered on zero.
///
/// The result spans at most `±(max - min) / 2` of the shaped values. A field
/// that shapes to a constant comes back as all zeros.
pub fn ridge(field: &Field, sharpness: f64) -> Result<Field> {
    check_exponent(sharpness)?;
    let mut shaped = field.map(|&v| (1.0 - v.abs()).powf(sharpness));
    let (lo, hi) = shaped.min_max();
    shaped.offset(-0.5 * (lo + hi));
    Ok(shaped)
}

/// `|v|^softness`. Never negative.
pub fn billow(field: &Field, softness: f64) -> Result<Field> {
    check_exponent(softness)?;
    Ok(field.map(|&v| v.abs().powf(softness)))
}
