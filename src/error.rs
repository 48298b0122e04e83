//! Error type shared by every stage of the terrain pipeline.
//!
//! All failures are input validation or file I/O; a rejected call has no
//! side effects.

use thiserror::Error;

use crate::grid::Shape;

pub type Result<T> = std::result::Result<T, TerrainError>;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("invalid shape {height}x{width}: both dimensions must be positive")]
    InvalidShape { height: usize, width: usize },

    #[error("invalid scale {0}: must be finite and greater than zero")]
    InvalidScale(f64),

    #[error("invalid zoom {0}: must be finite and greater than zero")]
    InvalidZoom(f64),

    #[error("invalid offset ({0}, {1}): must be finite")]
    InvalidOffset(f64, f64),

    #[error("octave parameter out of range: {0}")]
    OctaveParameterOutOfRange(String),

    #[error("invalid warp parameters: {0}")]
    InvalidWarp(String),

    #[error("invalid shaping exponent {0}: must be finite and greater than zero")]
    InvalidShaping(f64),

    #[error("invalid erosion factor {0}: must be finite and non-negative")]
    InvalidErosion(f64),

    #[error("invalid height scale {0}: must be finite")]
    InvalidHeightScale(f64),

    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: Shape, found: Shape },

    #[error("buffer holds {found} values, shape needs {expected}")]
    BufferLength { expected: usize, found: usize },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
