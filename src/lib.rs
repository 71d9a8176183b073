//! # BIOTOPE
//!
//! A small 2D artificial-life simulation: organisms forage for plants,
//! steer with a prioritized set of behaviours, mate with similar-hued
//! partners and leave fading trails.
//!
//! ## Features
//!
//! - **Deterministic**: every random draw goes through one seeded source
//! - **Observable**: typed events for births, deaths, feeding and stats
//! - **Configurable**: YAML configuration files
//! - **Frame-limited**: drive from a wall clock or run headless
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use biotope::{Config, World};
//!
//! let mut world = World::new_with_seed(Config::default(), 42);
//! world.run(1000);
//!
//! println!("Population: {}", world.population());
//! println!("Plants: {}", world.plants.len());
//! ```
//!
//! ## Events
//!
//! ```rust
//! use biotope::{Config, World, WorldEvent};
//!
//! let mut world = World::new_with_seed(Config::default(), 7);
//! world.subscribe(|event: &WorldEvent| {
//!     if let WorldEvent::StatsUpdate(stats) = event {
//!         println!("{}", stats.summary());
//!     }
//! });
//! world.run(30);
//! ```

pub mod config;
pub mod events;
pub mod genetics;
pub mod organism;
pub mod plant;
pub mod random;
pub mod stats;
pub mod trail;
pub mod world;

// Re-export main types
pub use config::Config;
pub use events::{EventKind, SubscriptionId, WorldEvent, WorldObserver};
pub use genetics::{Genes, Hue};
pub use organism::{Drive, Organism, OrganismId};
pub use plant::{Plant, PlantId};
pub use random::RandomSource;
pub use stats::{Stats, StatsHistory};
pub use trail::TrailField;
pub use world::{World, WorldState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick headless benchmark
pub fn benchmark(steps: u64, population: usize, seed: u64) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.organisms.initial_population = population;

    let mut world = World::new_with_seed(config, seed);

    let start = Instant::now();
    world.run(steps);
    let elapsed = start.elapsed();

    BenchmarkResult {
        steps,
        initial_population: population,
        final_population: world.population(),
        final_plants: world.plants.len(),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub final_plants: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Plants: {}", self.final_plants)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        Ok(())
    }
}
