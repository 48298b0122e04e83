//! Seed selection for the noise kernels.
//!
//! Seeding is an explicit value handed to every permutation table, never
//! process-wide state. `Fixed` seeds reproduce terrain bit for bit; `Time`
//! draws a fresh seed from the wall clock each time it is resolved.

use serde::{Deserialize, Serialize};

/// Step between derived sub-seeds of a fixed seed.
const SUB_SEED_STRIDE: u32 = 1111;

/// How a permutation table obtains its seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// Reproducible noise from a constant seed.
    Fixed(u32),
    /// New noise on every evaluation, seeded from the current time.
    Time,
}

impl Default for SeedMode {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl SeedMode {
    /// Concrete seed for one table construction.
    pub fn resolve(&self) -> u32 {
        match *self {
            Self::Fixed(seed) => seed,
            Self::Time => time_seed(),
        }
    }

    /// Seed mode for an auxiliary stage (e.g. one warp field).
    ///
    /// Fixed seeds are offset by `salt` strides so auxiliary fields differ
    /// from the main kernel yet stay reproducible; time seeding stays fresh.
    pub fn derive(&self, salt: u32) -> Self {
        match *self {
            Self::Fixed(seed) => Self::Fixed(seed.wrapping_add(salt.wrapping_mul(SUB_SEED_STRIDE))),
            Self::Time => Self::Time,
        }
    }

    pub fn is_reproducible(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl std::fmt::Display for SeedMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(seed) => write!(f, "fixed({})", seed),
            Self::Time => write!(f, "time"),
        }
    }
}

/// Fold the current wall-clock time into a 32-bit seed.
fn time_seed() -> u32 {
    let now = chrono::Utc::now();
    let secs = now.timestamp() as u64;
    let nanos = now.timestamp_subsec_nanos() as u64;
    let mixed = secs.wrapping_mul(1_000_000_007) ^ nanos;
    (mixed ^ (mixed >> 32)) as u32
}
