//! Finite-difference helpers for the erosion filter.

use rayon::prelude::*;

use crate::grid::{Field, Grid};

/// Derivative of one row or column sampled with unit spacing.
///
/// Central differences inside, one-sided first differences at both ends,
/// zero when there is only a single sample.
#[inline]
fn derivative_at(len: usize, i: usize, sample: impl Fn(usize) -> f64) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        sample(1) - sample(0)
    } else if i == len - 1 {
        sample(i) - sample(i - 1)
    } else {
        0.5 * (sample(i + 1) - sample(i - 1))
    }
}

/// Numerical gradient of a field as `(d/d_row, d/d_col)`.
///
/// The first component runs down the columns (noise-space Y), the second
/// along the rows (noise-space X).
pub fn gradient(field: &Field) -> (Field, Field) {
    let shape = field.shape();
    let (width, height) = (shape.width, shape.height);
    let data = field.as_slice();

    let mut d_row = Grid::new_with(shape, 0.0);
    let mut d_col = Grid::new_with(shape, 0.0);

    d_row
        .as_mut_slice()
        .par_chunks_mut(width)
        .zip(d_col.as_mut_slice().par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (dr, dc))| {
            let row = &data[y * width..(y + 1) * width];
            for x in 0..width {
                dr[x] = derivative_at(height, y, |yy| data[yy * width + x]);
                dc[x] = derivative_at(width, x, |xx| row[xx]);
            }
        });

    (d_row, d_col)
}
