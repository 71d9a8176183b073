//! Heritable movement traits.

use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

pub const MIN_SPEED: f64 = 0.5;
pub const MIN_VISION: f64 = 10.0;
pub const MIN_RANDOMNESS: f64 = 0.1;

/// Half-width of the multiplicative jitter applied on inheritance.
pub const MUTATION_SPREAD: f64 = 0.1;

/// The trait set {speed, vision, randomness}.
///
/// Values are floored on every construction path, so a `Genes` held by an
/// organism never has a zero or negative trait.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genes {
    pub speed: f64,
    pub vision: f64,
    pub randomness: f64,
}

impl Genes {
    /// Build genes, clamping each trait to its floor.
    pub fn new(speed: f64, vision: f64, randomness: f64) -> Self {
        Self {
            speed: speed.max(MIN_SPEED),
            vision: vision.max(MIN_VISION),
            randomness: randomness.max(MIN_RANDOMNESS),
        }
    }

    /// Re-apply the floors. `NaN` traits fall back to the floor as well.
    pub fn clamped(self) -> Self {
        Self::new(self.speed, self.vision, self.randomness)
    }

    /// Genes for a freshly seeded organism.
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Self::new(
            1.0 + rng.uniform(0.0, 1.5),
            20.0 + rng.uniform(0.0, 40.0),
            0.3 + rng.uniform(0.0, 0.7),
        )
    }

    /// Single-parent inheritance: each trait scaled by `1 + U(-0.1, 0.1)`.
    pub fn mutated(&self, rng: &mut dyn RandomSource) -> Self {
        let speed = self.speed * jitter(rng);
        let vision = self.vision * jitter(rng);
        let randomness = self.randomness * jitter(rng);
        Self::new(speed, vision, randomness)
    }

    /// Whether every trait sits at or above its floor.
    pub fn is_valid(&self) -> bool {
        self.speed >= MIN_SPEED && self.vision >= MIN_VISION && self.randomness >= MIN_RANDOMNESS
    }
}

impl Default for Genes {
    fn default() -> Self {
        Self::new(1.5, 40.0, 0.8)
    }
}

#[inline]
pub(crate) fn jitter(rng: &mut dyn RandomSource) -> f64 {
    1.0 + rng.uniform(-MUTATION_SPREAD, MUTATION_SPREAD)
}
