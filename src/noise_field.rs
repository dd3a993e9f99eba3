//! seeded scalar noise shared by the terrain and water generators
use noise::{NoiseFn, Perlin};

use crate::constants::NOISE_CONTRAST;

/// Deterministic, continuous scalar field in `[0, 1]`.
///
/// The same `(a, b, seed)` always yields the same value, and the value varies
/// smoothly in `a` and `b`.
pub trait NoiseSource: Send + Sync {
    fn noise(&self, a: f64, b: f64, seed: u32) -> f64;
}

/// Perlin-backed field; the seed selects a slice along the third axis.
pub struct PerlinField {
    perlin: Perlin,
}

impl PerlinField {
    pub fn new(base_seed: u32) -> Self {
        Self {
            perlin: Perlin::new(base_seed),
        }
    }
}

impl Default for PerlinField {
    fn default() -> Self {
        Self::new(0)
    }
}

#[inline]
fn seed_axis(seed: u32) -> f64 {
    // golden-ratio spacing keeps slices apart and off the integer lattice
    (seed as f64 * 0.618_033_988_75).fract() * 256.0 + 0.5
}

impl NoiseSource for PerlinField {
    fn noise(&self, a: f64, b: f64, seed: u32) -> f64 {
        let raw = self.perlin.get([a, b, seed_axis(seed)]);
        (raw * NOISE_CONTRAST * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}
