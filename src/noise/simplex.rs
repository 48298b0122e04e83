//! 2D simplex noise on a skewed triangular lattice.
//!
//! Raw simplex sums are small and grid dependent, so the field is stretched
//! to exactly `[-1, 1]` using its realized min and max. This makes a sample's
//! value depend on the whole grid it was evaluated with.

use crate::coords::CoordGrid;
use crate::grid::Field;
use crate::noise::permutation::{PermutationTable, TABLE_SIZE};

// Skew/unskew constants
// F2 = (sqrt(3) - 1) / 2
// G2 = (3 - sqrt(3)) / 6
const F2: f64 = 0.366_025_403_784_438_6;
const G2: f64 = 0.211_324_865_405_187_13;

/// Diagonals first, then axis directions.
const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

#[inline]
fn corner(hash: usize, dx: f64, dy: f64) -> f64 {
    let t = (0.5 - dx * dx - dy * dy).max(0.0);
    let (gx, gy) = GRADIENTS[hash % 8];
    let t2 = t * t;
    (gx * dx + gy * dy) * (t2 * t2)
}

/// Unnormalized simplex sum at one point.
#[inline]
pub fn simplex_raw(table: &PermutationTable, x: f64, y: f64) -> f64 {
    let s = (x + y) * F2;
    let i = (x + s).floor();
    let j = (y + s).floor();

    let t = (i + j) * G2;
    let x0 = x - i + t;
    let y0 = y - j + t;

    // Lower or upper triangle of the skewed cell
    let (i1, j1) = if x0 > y0 { (1usize, 0usize) } else { (0, 1) };

    let x1 = x0 - i1 as f64 + G2;
    let y1 = y0 - j1 as f64 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let y2 = y0 - 1.0 + 2.0 * G2;

    let ii = i.rem_euclid(TABLE_SIZE as f64) as usize;
    let jj = j.rem_euclid(TABLE_SIZE as f64) as usize;

    let gi0 = table.at(ii + table.at(jj));
    let gi1 = table.at(ii + i1 + table.at(jj + j1));
    let gi2 = table.at(ii + 1 + table.at(jj + 1));

    corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2)
}

/// Simplex noise over a coordinate grid, rescaled to span `[-1, 1]`.
///
/// A grid whose raw values are all equal (e.g. a single sample) maps to zeros.
pub fn simplex(table: &PermutationTable, coords: &CoordGrid) -> Field {
    coords
        .map_points(|x, y| simplex_raw(table, x, y))
        .rescale(-1.0, 1.0)
}
