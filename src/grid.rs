//! Dense 2D arrays used throughout the noise pipeline.
//!
//! Storage is row-major: element `(x, y)` lives at `data[y * width + x]`,
//! so `x` is the column (noise-space X) and `y` the row (noise-space Y).
//! Bulk operations run over the flat buffer with rayon.

use rayon::prelude::*;

use crate::error::{Result, TerrainError};

/// Grid dimensions in rows and columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub height: usize,
    pub width: usize,
}

impl Shape {
    /// Validated shape; both dimensions must be positive.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(TerrainError::InvalidShape { height, width });
        }
        Ok(Self { height, width })
    }

    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A 2D grid of values with row-major storage.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Real-valued 2D array: noise fields, height fields and coordinate planes.
pub type Field = Grid<f64>;

impl<T: Clone + Default> Grid<T> {
    pub fn new(shape: Shape) -> Self {
        Self::new_with(shape, T::default())
    }
}

impl<T: Clone> Grid<T> {
    pub fn new_with(shape: Shape, value: T) -> Self {
        Self {
            width: shape.width,
            height: shape.height,
            data: vec![value; shape.len()],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major buffer.
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(TerrainError::BufferLength {
                expected: shape.len(),
                found: data.len(),
            });
        }
        Ok(Self {
            width: shape.width,
            height: shape.height,
            data,
        })
    }

    /// Internal constructor for buffers already known to match `shape`.
    pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), shape.len());
        Self {
            width: shape.width,
            height: shape.height,
            data,
        }
    }

    pub fn shape(&self) -> Shape {
        Shape {
            height: self.height,
            width: self.width,
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Rows top to bottom, each `width` long.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks(self.width)
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

impl<T: Send + Sync> Grid<T> {
    /// Elementwise map into a new grid of the same shape.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.par_iter().map(f).collect(),
        }
    }

    /// Elementwise in-place update.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(&mut T) + Sync + Send,
    {
        self.data.par_iter_mut().for_each(f);
    }

    /// Combine two same-shaped grids elementwise.
    pub fn zip_map<U, V, F>(&self, other: &Grid<U>, f: F) -> Result<Grid<V>>
    where
        U: Send + Sync,
        V: Send,
        F: Fn(&T, &U) -> V + Sync + Send,
    {
        if self.shape() != other.shape() {
            return Err(TerrainError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        Ok(Grid {
            width: self.width,
            height: self.height,
            data: self
                .data
                .par_iter()
                .zip(other.data.par_iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        })
    }
}

impl Grid<f64> {
    /// Realized `(min, max)` over the field.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .par_iter()
            .fold(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &v| (lo.min(v), hi.max(v)),
            )
            .reduce(
                || (f64::INFINITY, f64::NEG_INFINITY),
                |(a, b), (c, d)| (a.min(c), b.max(d)),
            )
    }

    pub fn min(&self) -> f64 {
        self.min_max().0
    }

    pub fn max(&self) -> f64 {
        self.min_max().1
    }

    /// Largest absolute value in the field.
    pub fn max_abs(&self) -> f64 {
        let (lo, hi) = self.min_max();
        lo.abs().max(hi.abs())
    }

    pub fn mean(&self) -> f64 {
        self.data.par_iter().sum::<f64>() / self.data.len() as f64
    }

    /// Multiply every value by `k`.
    pub fn scale(&mut self, k: f64) {
        self.apply(|v| *v *= k);
    }

    /// Add a constant to every value.
    pub fn offset(&mut self, k: f64) {
        self.apply(|v| *v += k);
    }

    /// `self += k * other`.
    pub fn add_scaled(&mut self, other: &Field, k: f64) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(TerrainError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(a, &b)| *a += k * b);
        Ok(())
    }

    /// Linearly remap the realized range onto `[lo, hi]`.
    ///
    /// A constant field has no range to stretch; every value becomes the
    /// midpoint of the target interval.
    pub fn rescale(&self, lo: f64, hi: f64) -> Field {
        let (min, max) = self.min_max();
        let range = max - min;
        if range <= 0.0 || !range.is_finite() {
            return Grid::new_with(self.shape(), 0.5 * (lo + hi));
        }
        self.map(|&v| lo + (hi - lo) * ((v - min) / range))
    }

    pub fn is_finite(&self) -> bool {
        self.data.par_iter().all(|v| v.is_finite())
    }
}
