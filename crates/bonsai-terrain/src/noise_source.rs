//! Deterministic 2D coherent noise in `[0, 1]`.

use noise::{NoiseFn, Perlin};

/// Lattice seed of the underlying Perlin permutation table.
///
/// Terrain variation comes from shifting the sample coordinates by a seed
/// pair, not from reseeding the permutation table, so every terrain shares
/// this value.
pub const PERLIN_SEED: u32 = 0;

/// Coherent 2D noise remapped to `[0, 1]`.
///
/// A pure function of its coordinates: two sources built from the same seed
/// return bit-identical values for the same input. Integer lattice points
/// sample to exactly `0.5`.
#[derive(Clone)]
pub struct NoiseSource {
    perlin: Perlin,
}

impl NoiseSource {
    /// Create a noise source over the given permutation seed.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Sample the noise field at `(x, y)`.
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let raw = self.perlin.get([x as f64, y as f64]);
        (((raw + 1.0) * 0.5) as f32).clamp(0.0, 1.0)
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(PERLIN_SEED)
    }
}

impl std::fmt::Debug for NoiseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSource").finish_non_exhaustive()
    }
}
