//! Hue-based colouring, mating compatibility and colour inheritance.

use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compatibility window in degrees.
pub const COMPATIBLE_HUE_DISTANCE: f64 = 30.0;

/// Half-width of the shift applied by [`Hue::mutated`].
pub const HUE_MUTATION: f64 = 20.0;

/// A hue on the 360° colour wheel, kept in `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hue(f64);

impl Hue {
    /// Wrap any finite angle in degrees onto the wheel. Non-finite input maps to 0.
    pub fn new(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Hue(0.0);
        }
        let wrapped = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negatives
        Hue(if wrapped >= 360.0 { 0.0 } else { wrapped })
    }

    pub fn random(rng: &mut dyn RandomSource) -> Self {
        Hue::new(rng.uniform(0.0, 360.0))
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Parse the hue out of an `hsl(<hue>, s%, l%)` string.
    ///
    /// Only the leading integer digits are read, so `hsl(187.5, ...)` yields 187.
    /// Anything unparseable yields hue 0.
    pub fn parse(color: &str) -> Self {
        let Some(start) = color.find("hsl(") else {
            return Hue(0.0);
        };
        let digits: String = color[start + 4..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<f64>().map(Hue::new).unwrap_or_default()
    }

    /// Same kind: raw hue difference under 30° or over 330°.
    pub fn is_compatible(self, other: Hue) -> bool {
        self.is_within(other, COMPATIBLE_HUE_DISTANCE)
    }

    /// Like [`Hue::is_compatible`] with a custom window.
    pub fn is_within(self, other: Hue, tolerance: f64) -> bool {
        let diff = (self.whole() - other.whole()).abs();
        diff < tolerance || diff > 360.0 - tolerance
    }

    /// Child hue: plain average of the two parents' whole degrees.
    ///
    /// This is not the circular mean; mixing 350° and 10° gives 180°.
    pub fn mix(self, other: Hue) -> Hue {
        Hue::new(((self.whole() + other.whole()) / 2.0) % 360.0)
    }

    /// Whole degrees, as carried by the CSS colour string
    #[inline]
    fn whole(self) -> f64 {
        self.0.floor()
    }

    /// Shift by `U(-20, 20)` degrees and wrap.
    pub fn mutated(self, rng: &mut dyn RandomSource) -> Hue {
        Hue::new((self.0 + rng.uniform(-HUE_MUTATION, HUE_MUTATION) + 360.0) % 360.0)
    }

    /// CSS colour string handed to renderers.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Hue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, 70%, 50%)", self.0)
    }
}

impl From<f64> for Hue {
    fn from(degrees: f64) -> Self {
        Hue::new(degrees)
    }
}
