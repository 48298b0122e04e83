//! Seeded permutation table shared by the lattice noise kernels.
//!
//! The shuffle is driven by a 32-bit Mersenne Twister and a masked-rejection
//! Fisher-Yates walk, which reproduces NumPy's legacy `RandomState`
//! permutation for the same seed. Seed 0 is the canonical reproducible
//! table.

use rand::{RngCore, SeedableRng};

use crate::seeds::SeedMode;

/// Number of distinct gradient hashes; lattice noise repeats with this period.
pub const TABLE_SIZE: usize = 256;

// MT19937 constants
const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// 32-bit Mersenne Twister (MT19937) with `init_genrand` seeding.
#[derive(Clone)]
pub struct Mt19937 {
    state: [u32; N],
    index: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; N];
        state[0] = seed;
        for i in 1..N {
            let prev = state[i - 1];
            state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        Self { state, index: N }
    }

    fn twist(&mut self) {
        for k in 0..N {
            let y = (self.state[k] & UPPER_MASK) | (self.state[(k + 1) % N] & LOWER_MASK);
            let mut v = self.state[(k + M) % N] ^ (y >> 1);
            if y & 1 != 0 {
                v ^= MATRIX_A;
            }
            self.state[k] = v;
        }
        self.index = 0;
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        if self.index >= N {
            self.twist();
        }
        let mut y = self.state[self.index];
        self.index += 1;

        // Tempering
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// Uniform integer in `0..=max` by masking to the next power of two and
/// rejecting overshoots.
fn bounded<R: RngCore>(rng: &mut R, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let mut mask = max;
    mask |= mask >> 1;
    mask |= mask >> 2;
    mask |= mask >> 4;
    mask |= mask >> 8;
    mask |= mask >> 16;
    loop {
        let value = rng.next_u32() & mask;
        if value <= max {
            return value;
        }
    }
}

/// Shuffle `0..n` walking from the back, swapping each slot with a bounded
/// draw over the unshuffled prefix.
fn shuffled_indices<R: RngCore>(rng: &mut R, n: usize) -> Vec<usize> {
    let mut values: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = bounded(rng, i as u32) as usize;
        values.swap(i, j);
    }
    values
}

/// A permutation of `0..256` stored twice so lookups of `p[i + j]` with
/// `i, j < 256` never need a modulus.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; 2 * TABLE_SIZE],
    seed: u32,
}

impl PermutationTable {
    pub fn new(seed: u32) -> Self {
        let mut rng = Mt19937::new(seed);
        let shuffled = shuffled_indices(&mut rng, TABLE_SIZE);

        let mut perm = [0u8; 2 * TABLE_SIZE];
        for (i, &v) in shuffled.iter().enumerate() {
            perm[i] = v as u8;
            perm[i + TABLE_SIZE] = v as u8;
        }
        Self { perm, seed }
    }

    /// Resolve the seed mode now and build a table from it.
    pub fn from_mode(mode: SeedMode) -> Self {
        let seed = mode.resolve();
        tracing::trace!(%mode, seed, "building permutation table");
        Self::new(seed)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Direct lookup; `index` must be below 512.
    #[inline]
    pub fn at(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// `p[(p[x mod 256] + y) mod 256]` for any integer lattice point.
    #[inline]
    pub fn hash2(&self, x: i64, y: i64) -> usize {
        let n = TABLE_SIZE as i64;
        let px = self.at(x.rem_euclid(n) as usize);
        self.at((px + y.rem_euclid(n) as usize) % TABLE_SIZE)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.perm
    }
}

impl Default for PermutationTable {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("seed", &self.seed)
            .field("head", &&self.perm[..8])
            .finish()
    }
}
