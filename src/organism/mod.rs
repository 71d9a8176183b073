//! Organism structure, feeding and reproduction.
//!
//! The per-tick direction decision lives in [`steering`].

pub mod steering;

use crate::config::Config;
use crate::genetics::{crossover, Genes, Hue};
use crate::plant::Plant;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

pub use steering::{Drive, EdgeZones, Neighborhood};

/// Unique organism identifier
pub type OrganismId = u64;

/// An organism in the simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organism {
    // Identity
    pub id: OrganismId,

    // Physical state
    pub x: f64,
    pub y: f64,
    pub energy: f64,
    pub hue: Hue,
    pub size: f64,
    pub genes: Genes,
    pub age: u32,

    // Movement state
    pub last_direction: f64,
    pub stuck_counter: u32,
    pub last_x: f64,
    pub last_y: f64,
    pub direction_change_timer: u32,

    /// Strategy that set the heading on the last tick
    pub last_drive: Option<Drive>,
}

/// Serializable view of an organism for observers and renderers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganismSnapshot {
    pub id: OrganismId,
    pub x: f64,
    pub y: f64,
    pub energy: f64,
    pub hue: Hue,
    /// CSS colour, `hsl(<hue>, 70%, 50%)`
    pub color: String,
    pub size: f64,
    pub genes: Genes,
    pub last_direction: f64,
    pub age: u32,
}

impl Organism {
    /// Create an organism with the configured starting energy, a random hue
    /// and random genes
    pub fn new(id: OrganismId, x: f64, y: f64, config: &Config, rng: &mut dyn RandomSource) -> Self {
        let hue = Hue::random(rng);
        let genes = Genes::random(rng);
        Self::with_traits(id, x, y, config.organisms.initial_energy, hue, genes, config, rng)
    }

    /// Create an organism with explicit energy, hue and genes.
    /// Genes are floored; only the initial heading is random.
    #[allow(clippy::too_many_arguments)]
    pub fn with_traits(
        id: OrganismId,
        x: f64,
        y: f64,
        energy: f64,
        hue: Hue,
        genes: Genes,
        config: &Config,
        rng: &mut dyn RandomSource,
    ) -> Self {
        Self {
            id,
            x,
            y,
            energy,
            hue,
            size: config.organisms.size,
            genes: genes.clamped(),
            age: 0,
            last_direction: rng.angle(),
            stuck_counter: 0,
            last_x: x,
            last_y: y,
            direction_change_timer: 0,
            last_drive: None,
        }
    }

    /// Check if organism is dead
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.energy <= 0.0
    }

    #[inline]
    pub fn is_hungry(&self, config: &Config) -> bool {
        self.energy < config.behavior.hunger_threshold
    }

    /// Euclidean distance to another organism
    #[inline]
    pub fn distance_to(&self, other: &Organism) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// CSS colour string
    pub fn color(&self) -> String {
        self.hue.to_css()
    }

    pub fn is_compatible_with(&self, other: &Organism, config: &Config) -> bool {
        self.hue.is_within(other.hue, config.reproduction.hue_tolerance)
    }

    /// Eat at most one plant touching this organism.
    ///
    /// Plants are scanned from the back; the first one closer than the sum of
    /// both radii is removed and returned.
    pub fn try_to_eat(&mut self, plants: &mut Vec<Plant>, config: &Config) -> Option<Plant> {
        let index = plants
            .iter()
            .rposition(|plant| plant.distance_to(self.x, self.y) < self.size + plant.size)?;

        self.energy = (self.energy + config.organisms.food_energy).min(config.organisms.max_energy);
        Some(plants.remove(index))
    }

    /// Split in two once energy reaches the asexual threshold.
    ///
    /// The parent keeps half its energy and the child starts with the same
    /// amount, slightly mutated and displaced.
    pub fn maybe_reproduce(
        &mut self,
        child_id: OrganismId,
        config: &Config,
        rng: &mut dyn RandomSource,
    ) -> Option<Organism> {
        let params = &config.reproduction;
        if self.energy < params.asexual_threshold {
            return None;
        }

        self.energy /= 2.0;

        let genes = self.genes.mutated(rng);
        let x = self.x + rng.uniform(-params.asexual_spread, params.asexual_spread);
        let y = self.y + rng.uniform(-params.asexual_spread, params.asexual_spread);
        let hue = self.hue.mutated(rng);

        Some(Organism::with_traits(child_id, x, y, self.energy, hue, genes, config, rng))
    }

    /// Mate with a nearby, compatible partner.
    ///
    /// Both parents need at least `mate_energy` and pay `mate_cost`; the child
    /// starts near their midpoint with `child_energy`.
    pub fn try_to_reproduce_with(
        &mut self,
        partner: &mut Organism,
        child_id: OrganismId,
        config: &Config,
        rng: &mut dyn RandomSource,
    ) -> Option<Organism> {
        if !self.can_mate_with(partner, config) {
            return None;
        }

        let params = &config.reproduction;
        self.energy -= params.mate_cost;
        partner.energy -= params.mate_cost;

        let genes = crossover(&self.genes, &partner.genes, rng);
        let hue = self.hue.mix(partner.hue);
        let x = (self.x + partner.x) / 2.0 + rng.uniform(-params.child_jitter, params.child_jitter);
        let y = (self.y + partner.y) / 2.0 + rng.uniform(-params.child_jitter, params.child_jitter);

        Some(Organism::with_traits(child_id, x, y, params.child_energy, hue, genes, config, rng))
    }

    /// Mating gate: distinct, in range, both fed, same kind
    pub fn can_mate_with(&self, partner: &Organism, config: &Config) -> bool {
        let params = &config.reproduction;
        let fed = |o: &Organism| {
            o.energy >= params.mate_energy && o.energy >= config.behavior.hunger_threshold
        };

        self.id != partner.id
            && self.distance_to(partner) < params.mate_distance
            && fed(self)
            && fed(partner)
            && self.is_compatible_with(partner, config)
    }

    pub fn snapshot(&self) -> OrganismSnapshot {
        OrganismSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            energy: self.energy,
            hue: self.hue,
            color: self.color(),
            size: self.size,
            genes: self.genes,
            last_direction: self.last_direction,
            age: self.age,
        }
    }
}
