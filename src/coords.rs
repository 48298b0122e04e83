//! Sampling windows and the coordinate grids built from them.
//!
//! A window describes which part of noise space a field covers: `scale / zoom`
//! lattice units across each axis, starting at `offset`. The linear grid
//! follows a half-open linspace, so column `j` of a `W`-wide window sits at
//! `j * (scale / zoom) / W + offset.0`.

use rayon::prelude::*;

use crate::error::{Result, TerrainError};
use crate::grid::{Field, Grid, Shape};

/// Region of noise space sampled into a `shape`-sized field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleWindow {
    pub shape: Shape,
    pub scale: f64,
    pub offset: (f64, f64),
    pub zoom: f64,
}

impl SampleWindow {
    /// Build a validated window. Scale and zoom must be finite and positive.
    pub fn new(shape: Shape, scale: f64, offset: (f64, f64), zoom: f64) -> Result<Self> {
        let window = Self {
            shape,
            scale,
            offset,
            zoom,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        Shape::new(self.shape.height, self.shape.width)?;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(TerrainError::InvalidScale(self.scale));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(TerrainError::InvalidZoom(self.zoom));
        }
        if !(self.offset.0.is_finite() && self.offset.1.is_finite()) {
            return Err(TerrainError::InvalidOffset(self.offset.0, self.offset.1));
        }
        Ok(())
    }

    /// Lattice units covered along each axis.
    pub fn span(&self) -> f64 {
        self.scale / self.zoom
    }

    /// Window for an octave sampled at `frequency` times the base.
    ///
    /// Zoom is folded into the scale so the octave window has zoom 1; the
    /// offset is scaled with the frequency to keep panning consistent.
    pub fn octave(&self, frequency: f64) -> Self {
        Self {
            shape: self.shape,
            scale: (self.scale * frequency) / self.zoom,
            offset: (self.offset.0 * frequency, self.offset.1 * frequency),
            zoom: 1.0,
        }
    }
}

/// Sample positions for every cell of a field: `x[y][x]`, `y[y][x]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordGrid {
    x: Field,
    y: Field,
}

impl CoordGrid {
    /// Evenly spaced, unperturbed grid for a window.
    pub fn linear(window: &SampleWindow) -> Self {
        let shape = window.shape;
        let span = window.span();
        let step_x = span / shape.width as f64;
        let step_y = span / shape.height as f64;
        let (off_x, off_y) = window.offset;

        let mut x = Grid::new_with(shape, 0.0);
        let mut y = Grid::new_with(shape, 0.0);

        x.as_mut_slice()
            .par_chunks_mut(shape.width)
            .zip(y.as_mut_slice().par_chunks_mut(shape.width))
            .enumerate()
            .for_each(|(row, (xs, ys))| {
                let yv = row as f64 * step_y + off_y;
                for (col, (xv, yo)) in xs.iter_mut().zip(ys.iter_mut()).enumerate() {
                    *xv = col as f64 * step_x + off_x;
                    *yo = yv;
                }
            });

        Self { x, y }
    }

    /// Pair two planes into a grid; they must share a shape.
    pub fn from_planes(x: Field, y: Field) -> Result<Self> {
        if x.shape() != y.shape() {
            return Err(TerrainError::ShapeMismatch {
                expected: x.shape(),
                found: y.shape(),
            });
        }
        Ok(Self { x, y })
    }

    pub fn shape(&self) -> Shape {
        self.x.shape()
    }

    pub fn x(&self) -> &Field {
        &self.x
    }

    pub fn y(&self) -> &Field {
        &self.y
    }

    /// Evaluate `f(x, y)` at every sample position.
    pub fn map_points<F>(&self, f: F) -> Field
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let data = self
            .x
            .as_slice()
            .par_iter()
            .zip(self.y.as_slice().par_iter())
            .map(|(&x, &y)| f(x, y))
            .collect();
        Grid::from_parts(self.shape(), data)
    }

    /// Displace every sample: `x += kx * dx`, `y += ky * dy`.
    pub fn displace(&mut self, dx: &Field, kx: f64, dy: &Field, ky: f64) -> Result<()> {
        self.x.add_scaled(dx, kx)?;
        self.y.add_scaled(dy, ky)
    }
}
