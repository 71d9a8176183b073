//! Two-parent trait crossover for sexual reproduction.

use crate::genetics::genes::{jitter, Genes};
use crate::random::RandomSource;

/// Average each trait of the two parents and jitter the result by
/// `U(-0.1, 0.1)`, then re-apply the floors.
///
/// Consumes exactly one draw per trait, in the order speed, vision,
/// randomness.
pub fn crossover(parent1: &Genes, parent2: &Genes, rng: &mut dyn RandomSource) -> Genes {
    let speed = average(parent1.speed, parent2.speed) * jitter(rng);
    let vision = average(parent1.vision, parent2.vision) * jitter(rng);
    let randomness = average(parent1.randomness, parent2.randomness) * jitter(rng);
    Genes::new(speed, vision, randomness)
}

#[inline]
fn average(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}
