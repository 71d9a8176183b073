//! Randomness seam for the simulation.
//!
//! Every stochastic decision in the crate draws from a [`RandomSource`].
//! Any `rand::Rng` qualifies, so the world normally runs on a seeded
//! `ChaCha8Rng`; tests can plug in a scripted source instead.

use rand::Rng;
use std::f64::consts::TAU;

/// Source of uniform draws.
pub trait RandomSource {
    /// Uniform sample in `[low, high)`. Returns `low` for an empty range.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform heading in `[0, 2π)`.
    fn angle(&mut self) -> f64 {
        self.uniform(0.0, TAU)
    }

    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.uniform(0.0, 1.0) < probability
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    #[inline]
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }
}

/// Replays a fixed list of unit samples (each in `[0, 1)`), cycling when
/// exhausted. `uniform(low, high)` maps sample `u` to `low + u * (high - low)`.
#[cfg(test)]
pub(crate) struct Scripted {
    samples: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(samples: &[f64]) -> Self {
        assert!(!samples.is_empty());
        Self {
            samples: samples.to_vec(),
            cursor: 0,
        }
    }

    /// A source that always lands on the midpoint of every range.
    pub(crate) fn midpoint() -> Self {
        Self::new(&[0.5])
    }

    pub(crate) fn draws(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let u = self.samples[self.cursor % self.samples.len()];
        self.cursor += 1;
        low + u * (high - low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rng_uniform_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rng.uniform(-0.1, 0.1);
            assert!((-0.1..0.1).contains(&v));
        }
    }

    #[test]
    fn test_empty_range_returns_low() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    #[test]
    fn test_scripted_cycles() {
        let mut source = Scripted::new(&[0.0, 0.5]);
        assert_eq!(source.uniform(0.0, 10.0), 0.0);
        assert_eq!(source.uniform(0.0, 10.0), 5.0);
        assert_eq!(source.uniform(-1.0, 1.0), -1.0);
        assert_eq!(source.draws(), 3);
    }

    #[test]
    fn test_dyn_dispatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let source: &mut dyn RandomSource = &mut rng;
        let a = source.angle();
        assert!((0.0..TAU).contains(&a));
    }
}
