//! Gradient-driven erosion filter
//!
//! A cheap visual approximation of water erosion, not a sediment simulation.
//! Four passes each take the numerical gradient of the current heights,
//! accumulate it into a running slope, and carve away the weighted squared
//! slope magnitude. The carved field is then divided by the total pass
//! amplitude and shifted back so its minimum equals the input's minimum.

pub mod params;
pub mod utils;

pub use params::{ErosionParams, EROSION_OCTAVES, EROSION_PERSISTENCE};

use rayon::prelude::*;

use crate::error::Result;
use crate::grid::{Field, Grid};

/// Erode a field in place.
///
/// Parameters are validated first; on error the field is untouched. An
/// empty-range field stays finite since no step divides by the data range.
pub fn erode(field: &mut Field, params: &ErosionParams) -> Result<()> {
    params.validate()?;

    let shape = field.shape();
    let original_min = field.min();
    let factor = params.erosion_factor;

    let mut slope_row: Field = Grid::new_with(shape, 0.0);
    let mut slope_col: Field = Grid::new_with(shape, 0.0);

    let mut amplitude = 1.0;
    let mut max_amplitude = 0.0;

    for pass in 0..EROSION_OCTAVES {
        let (g_row, g_col) = utils::gradient(field);
        slope_row.add_scaled(&g_row, 1.0)?;
        slope_col.add_scaled(&g_col, 1.0)?;

        let weight = amplitude * factor;
        field
            .as_mut_slice()
            .par_iter_mut()
            .zip(slope_row.as_slice().par_iter())
            .zip(slope_col.as_slice().par_iter())
            .for_each(|((h, &dr), &dc)| *h -= weight * (dr * dr + dc * dc));

        tracing::trace!(pass, amplitude, "erosion pass");
        max_amplitude += amplitude;
        amplitude *= EROSION_PERSISTENCE;
    }

    field.scale(1.0 / max_amplitude);
    let shift = original_min - field.min();
    field.offset(shift);

    tracing::debug!(
        shape = %shape,
        factor,
        min = original_min,
        max = field.max(),
        "erosion applied"
    );
    Ok(())
}

/// Eroded copy of `field`; the input is left as is.
pub fn eroded(field: &Field, params: &ErosionParams) -> Result<Field> {
    let mut out = field.clone();
    erode(&mut out, params)?;
    Ok(out)
}
