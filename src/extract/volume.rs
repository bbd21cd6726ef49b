//! Placeholder volumes for rows whose numeric field is missing or unreadable.
//!
//! The source is injected so tests can pin it down; production uses `rand`.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::config::VolumeRange;

pub trait VolumeSource {
    /// Draw a volume uniformly from `range` (inclusive, normalized to `min >= 1`).
    fn draw(&mut self, range: VolumeRange) -> u64;
}

/// `rand`-backed source. `RandomVolumes::default()` uses the thread RNG.
pub struct RandomVolumes<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomVolumes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomVolumes<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::rng())
    }
}

impl RandomVolumes<StdRng> {
    /// Reproducible sequence, for tests and replay.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> VolumeSource for RandomVolumes<R> {
    fn draw(&mut self, range: VolumeRange) -> u64 {
        let r = range.normalized();
        self.rng.random_range(r.min..=r.max)
    }
}

/// Always returns the same value, clamped into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedVolume(pub u64);

impl VolumeSource for FixedVolume {
    fn draw(&mut self, range: VolumeRange) -> u64 {
        let r = range.normalized();
        self.0.clamp(r.min, r.max)
    }
}
