//! Classic lattice-gradient (Perlin) noise.

use crate::coords::CoordGrid;
use crate::grid::Field;
use crate::noise::permutation::{PermutationTable, TABLE_SIZE};

/// Axis directions first, then diagonals; selected by `hash % 8`.
const GRADIENTS: [(f64, f64); 8] = [
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
];

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn dot_gradient(hash: usize, dx: f64, dy: f64) -> f64 {
    let (gx, gy) = GRADIENTS[hash % 8];
    gx * dx + gy * dy
}

/// Noise value at a single point. Zero on every integer lattice point.
#[inline]
pub fn perlin_point(table: &PermutationTable, x: f64, y: f64) -> f64 {
    let x0f = x.floor();
    let y0f = y.floor();
    // Reduce while still a float; large coordinates saturate an i64 cast.
    let x0 = x0f.rem_euclid(TABLE_SIZE as f64) as i64;
    let y0 = y0f.rem_euclid(TABLE_SIZE as f64) as i64;

    let sx = x - x0f;
    let sy = y - y0f;

    let n00 = dot_gradient(table.hash2(x0, y0), sx, sy);
    let n10 = dot_gradient(table.hash2(x0 + 1, y0), sx - 1.0, sy);
    let n01 = dot_gradient(table.hash2(x0, y0 + 1), sx, sy - 1.0);
    let n11 = dot_gradient(table.hash2(x0 + 1, y0 + 1), sx - 1.0, sy - 1.0);

    let u = fade(sx);
    let v = fade(sy);
    lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
}

/// Perlin noise over a whole coordinate grid. Values lie roughly in
/// `[-1, 1]`; no renormalization is applied.
pub fn perlin(table: &PermutationTable, coords: &CoordGrid) -> Field {
    coords.map_points(|x, y| perlin_point(table, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::SampleWindow;
    use crate::grid::Shape;

    fn grid(h: usize, w: usize, scale: f64, offset: (f64, f64)) -> CoordGrid {
        CoordGrid::linear(&SampleWindow::new(Shape::new(h, w).unwrap(), scale, offset, 1.0).unwrap())
    }

    fn assert_rows_close(field: &Field, expected: &[[f64; 4]; 4], tol: f64) {
        for (y, row) in expected.iter().enumerate() {
            for (x, &want) in row.iter().enumerate() {
                let got = *field.get(x, y);
                assert!((got - want).abs() <= tol, "({}, {}): got {}, want {}", x, y, got, want);
            }
        }
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert!((fade(0.5) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_lattice_points_fixture() {
        // 4x4 at scale 4 samples exactly the integer lattice.
        let field = perlin(&PermutationTable::new(0), &grid(4, 4, 4.0, (0.0, 0.0)));
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_off_lattice_fixture() {
        let field = perlin(&PermutationTable::new(0), &grid(4, 4, 3.0, (0.37, -1.61)));
        let expected = [
            [-0.29145708287277183, 0.21812868555135928, 0.28642516135195484, 0.16894883332428962],
            [-0.4774230166367018, 0.25182873949972556, -0.09504512135867187, -0.415263081000371],
            [0.17198266688910957, 0.1419901248135046, 0.2390201350662502, -0.23392154555475242],
            [-0.212381127724068, 0.10970478281585064, -0.20572492446311647, 0.14636355560482564],
        ];
        assert_rows_close(&field, &expected, 1e-12);
    }

    #[test]
    fn test_bit_reproducible() {
        let table = PermutationTable::new(0);
        let coords = grid(32, 48, 7.5, (-3.25, 11.0));
        assert_eq!(perlin(&table, &coords), perlin(&table, &coords));
        assert_eq!(perlin(&table, &coords), perlin(&PermutationTable::new(0), &coords));
    }

    #[test]
    fn test_period_256() {
        let table = PermutationTable::new(3);
        for &(x, y) in &[(0.3, 0.7), (-5.25, 2.5), (17.9, -40.1)] {
            let a = perlin_point(&table, x, y);
            let b = perlin_point(&table, x + 256.0, y);
            let c = perlin_point(&table, x, y - 512.0);
            assert!((a - b).abs() < 1e-9);
            assert!((a - c).abs() < 1e-9);
        }
    }

    #[test]
    fn test_huge_coordinates_wrap_to_lattice_cell() {
        let table = PermutationTable::new(0);
        for &big in &[1e300, -1e300, 9.3e18, -9.3e18] {
            let reduced = f64::rem_euclid(big, 256.0);
            assert_eq!(perlin_point(&table, 0.5, big), perlin_point(&table, 0.5, reduced));
            assert_eq!(perlin_point(&table, big, 0.25), perlin_point(&table, reduced, 0.25));
        }
        assert!(perlin_point(&table, f64::MAX, -f64::MAX).is_finite());
    }

    #[test]
    fn test_negative_coordinates_continuous() {
        // Crossing zero must not produce a seam.
        let table = PermutationTable::new(0);
        let eps = 1e-7;
        for &y in &[0.3, 1.7, -2.2] {
            let left = perlin_point(&table, -eps, y);
            let right = perlin_point(&table, eps, y);
            assert!((left - right).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bounded_and_finite() {
        let table = PermutationTable::new(9);
        let field = perlin(&table, &grid(64, 64, 12.0, (-6.0, -6.0)));
        assert!(field.is_finite());
        assert!(field.max_abs() <= 1.05);
        assert!(field.max_abs() > 0.05);
    }
}
