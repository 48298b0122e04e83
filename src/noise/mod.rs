//! Gradient noise kernels and the stages composed around them.
//!
//! - **Permutation**: seeded 256-entry hash table shared by every kernel
//! - **Perlin / Simplex**: lattice gradient kernels over a coordinate grid
//! - **Shaping**: ridge and billow transforms of a Perlin base
//! - **Fractal**: octave summation of any kernel
//! - **Warp**: iterative displacement of the sampling grid
//!
//! [`Noise`] ties a [`NoiseKind`] to a permutation table so callers select a
//! kernel by value instead of by function pointer.

pub mod fractal;
pub mod perlin;
pub mod permutation;
pub mod shaping;
pub mod simplex;
pub mod warp;

pub use fractal::{fractal, FractalParams};
pub use permutation::{Mt19937, PermutationTable, TABLE_SIZE};
pub use shaping::{billow, ridge};
pub use warp::{domain_warp, WarpParams};

use serde::{Deserialize, Serialize};

use crate::coords::{CoordGrid, SampleWindow};
use crate::error::Result;
use crate::grid::Field;
use crate::seeds::SeedMode;

/// Closed set of base kernels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoiseKind {
    Perlin,
    Simplex,
    /// Perlin shaped into crests, `(1 - |v|)^sharpness`
    Ridge { sharpness: f64 },
    /// Perlin shaped into rounded bumps, `|v|^softness`
    Billow { softness: f64 },
}

impl Default for NoiseKind {
    fn default() -> Self {
        Self::Perlin
    }
}

impl NoiseKind {
    pub fn all() -> &'static [Self] {
        &[
            Self::Perlin,
            Self::Simplex,
            Self::Ridge { sharpness: 1.0 },
            Self::Billow { softness: 1.0 },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Perlin => "perlin",
            Self::Simplex => "simplex",
            Self::Ridge { .. } => "ridge",
            Self::Billow { .. } => "billow",
        }
    }

    /// Output range contract for renderers.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Perlin => "Lattice gradient noise, roughly [-1, 1]",
            Self::Simplex => "Skewed-lattice noise, exactly [-1, 1]",
            Self::Ridge { .. } => "Sharp crests, centered on zero",
            Self::Billow { .. } => "Rounded bumps, non-negative",
        }
    }
}

impl std::fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ridge { sharpness } => write!(f, "ridge(p={})", sharpness),
            Self::Billow { softness } => write!(f, "billow(p={})", softness),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// A kernel bound to a permutation table.
#[derive(Clone, Debug)]
pub struct Noise {
    kind: NoiseKind,
    table: PermutationTable,
    seed_mode: SeedMode,
}

impl Noise {
    /// Build the kernel, resolving `seed_mode` into a table now.
    pub fn new(kind: NoiseKind, seed_mode: SeedMode) -> Self {
        Self {
            kind,
            table: PermutationTable::from_mode(seed_mode),
            seed_mode,
        }
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Evaluate over explicit sample positions.
    pub fn eval(&self, coords: &CoordGrid) -> Result<Field> {
        match self.kind {
            NoiseKind::Perlin => Ok(perlin::perlin(&self.table, coords)),
            NoiseKind::Simplex => Ok(simplex::simplex(&self.table, coords)),
            NoiseKind::Ridge { sharpness } => ridge(&perlin::perlin(&self.table, coords), sharpness),
            NoiseKind::Billow { softness } => billow(&perlin::perlin(&self.table, coords), softness),
        }
    }

    /// Evaluate over a window, on the linear grid or a warped one.
    ///
    /// Warp fields are seeded from the same mode as this kernel.
    pub fn sample(&self, window: &SampleWindow, warp: Option<&WarpParams>) -> Result<Field> {
        let coords = match warp {
            Some(params) => domain_warp(window, params, self.seed_mode)?,
            None => {
                window.validate()?;
                CoordGrid::linear(window)
            }
        };
        self.eval(&coords)
    }

    /// Octave sum of [`Noise::sample`].
    pub fn sample_fractal(
        &self,
        window: &SampleWindow,
        params: &FractalParams,
        warp: Option<&WarpParams>,
    ) -> Result<Field> {
        fractal(window, params, |ow| self.sample(ow, warp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;
    use crate::grid::Shape;

    fn window() -> SampleWindow {
        SampleWindow::new(Shape::new(10, 14).unwrap(), 4.0, (0.2, 0.9), 1.0).unwrap()
    }

    #[test]
    fn test_kinds_dispatch_to_kernels() {
        let coords = CoordGrid::linear(&window());
        let table = PermutationTable::new(0);
        let base = perlin::perlin(&table, &coords);

        let eval = |kind| Noise::new(kind, SeedMode::Fixed(0)).eval(&coords).unwrap();
        assert_eq!(eval(NoiseKind::Perlin), base);
        assert_eq!(eval(NoiseKind::Simplex), simplex::simplex(&table, &coords));
        assert_eq!(eval(NoiseKind::Ridge { sharpness: 2.0 }), ridge(&base, 2.0).unwrap());
        assert_eq!(eval(NoiseKind::Billow { softness: 0.5 }), billow(&base, 0.5).unwrap());
    }

    #[test]
    fn test_sample_without_warp_uses_linear_grid() {
        let noise = Noise::new(NoiseKind::Simplex, SeedMode::Fixed(2));
        let direct = noise.eval(&CoordGrid::linear(&window())).unwrap();
        assert_eq!(noise.sample(&window(), None).unwrap(), direct);
    }

    #[test]
    fn test_sample_with_warp_differs() {
        let noise = Noise::new(NoiseKind::Perlin, SeedMode::Fixed(0));
        let plain = noise.sample(&window(), None).unwrap();
        let warped = noise.sample(&window(), Some(&WarpParams::default())).unwrap();
        assert_ne!(plain, warped);
        assert!(warped.is_finite());

        let idle = WarpParams {
            warp_count: 0,
            ..Default::default()
        };
        assert_eq!(noise.sample(&window(), Some(&idle)).unwrap(), plain);
    }

    #[test]
    fn test_far_offset_samples_without_overflow() {
        let far = SampleWindow::new(Shape::new(2, 2).unwrap(), 4.0, (0.0, 1e300), 1.0).unwrap();
        for &kind in NoiseKind::all() {
            let noise = Noise::new(kind, SeedMode::Fixed(0));
            assert!(noise.sample(&far, None).unwrap().is_finite(), "{}", kind);
        }
        let perlin = Noise::new(NoiseKind::Perlin, SeedMode::Fixed(0));
        let fbm = perlin.sample_fractal(&far, &FractalParams::default(), None).unwrap();
        assert!(fbm.is_finite());
    }

    #[test]
    fn test_fractal_ridge_propagates_shaping_error() {
        let noise = Noise::new(NoiseKind::Ridge { sharpness: -1.0 }, SeedMode::Fixed(0));
        let result = noise.sample_fractal(&window(), &FractalParams::default(), None);
        assert!(matches!(result, Err(TerrainError::InvalidShaping(_))));
    }

    #[test]
    fn test_fractal_perlin_fixture_bound() {
        let noise = Noise::new(NoiseKind::Perlin, SeedMode::Fixed(0));
        let w = SampleWindow::new(Shape::new(8, 8).unwrap(), 10.0, (0.0, 0.0), 1.0).unwrap();
        let field = noise.sample_fractal(&w, &FractalParams::default(), None).unwrap();
        assert!(field.max_abs() <= 1.0 + 1e-9);
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&NoiseKind::Ridge { sharpness: 2.0 }).unwrap();
        assert_eq!(json, r#"{"type":"ridge","sharpness":2.0}"#);
        let back: NoiseKind = serde_json::from_str(r#"{"type":"simplex"}"#).unwrap();
        assert_eq!(back, NoiseKind::Simplex);
        assert_eq!(NoiseKind::Billow { softness: 0.5 }.to_string(), "billow(p=0.5)");
    }
}
