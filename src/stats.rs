//! Statistics tracking for the simulation.

use crate::organism::Organism;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Ticks since the last (re)start
    pub tick: u64,
    /// Living organisms
    pub organism_count: usize,
    /// Plants on the map
    pub plant_count: usize,
    /// Mean energy across organisms
    pub avg_energy: f64,
    /// Mean speed gene
    pub avg_speed: f64,
    /// Mean vision gene
    pub avg_vision: f64,
    /// Mean randomness gene
    pub avg_randomness: f64,
    /// Oldest organism alive
    pub max_age: u32,
    /// Births since the previous snapshot
    pub births: usize,
    /// Deaths since the previous snapshot
    pub deaths: usize,
    /// Plants eaten since the previous snapshot
    pub plants_eaten: usize,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute population aggregates. Means are 0 for an empty population.
    pub fn update(&mut self, organisms: &[Organism], plant_count: usize) {
        self.organism_count = organisms.len();
        self.plant_count = plant_count;

        if organisms.is_empty() {
            self.avg_energy = 0.0;
            self.avg_speed = 0.0;
            self.avg_vision = 0.0;
            self.avg_randomness = 0.0;
            self.max_age = 0;
            return;
        }

        let n = organisms.len() as f64;
        self.avg_energy = organisms.iter().map(|o| o.energy).sum::<f64>() / n;
        self.avg_speed = organisms.iter().map(|o| o.genes.speed).sum::<f64>() / n;
        self.avg_vision = organisms.iter().map(|o| o.genes.vision).sum::<f64>() / n;
        self.avg_randomness = organisms.iter().map(|o| o.genes.randomness).sum::<f64>() / n;
        self.max_age = organisms.iter().map(|o| o.age).max().unwrap_or(0);
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Pop:{:4} | Plants:{:3} | Energy:{:5.1} | Spd:{:.2} Vis:{:.1} Rnd:{:.2} | MaxAge:{} | +{} -{}",
            self.tick,
            self.organism_count,
            self.plant_count,
            self.avg_energy,
            self.avg_speed,
            self.avg_vision,
            self.avg_randomness,
            self.max_age,
            self.births,
            self.deaths,
        )
    }
}

/// Rolling window of recent stats snapshots
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// Recorded snapshots, oldest first
    pub snapshots: VecDeque<Stats>,
    /// Snapshots kept before the oldest is dropped
    pub capacity: usize,
}

impl StatsHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a snapshot, evicting the oldest when full
    pub fn record(&mut self, stats: Stats) {
        if self.capacity == 0 {
            return;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(stats);
    }

    pub fn latest(&self) -> Option<&Stats> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.organism_count))
            .collect()
    }

    /// Mean (speed, vision, randomness) over time
    pub fn gene_series(&self) -> Vec<(u64, [f64; 3])> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, [s.avg_speed, s.avg_vision, s.avg_randomness]))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
