//! Configuration system for the biotope simulation.
//!
//! Supports YAML configuration files with defaults matching the reference
//! sizing (800x600 world, 20 organisms, 30 plants).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub organisms: OrganismConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub reproduction: ReproductionConfig,
    #[serde(default)]
    pub plants: PlantConfig,
    #[serde(default)]
    pub trails: TrailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World dimensions and pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Distance from each edge organisms are confined to
    pub margin: f64,
    /// Target ticks per second for the frame limiter
    pub target_fps: f64,
}

/// Organism population and energetics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismConfig {
    /// Organisms seeded at start and after extinction
    pub initial_population: usize,
    /// Seeded organisms are kept this far from the edges
    pub spawn_margin: f64,
    /// Starting energy when none is given
    pub initial_energy: f64,
    /// Feeding never raises energy above this
    pub max_energy: f64,
    /// Energy gained per plant
    pub food_energy: f64,
    /// Energy paid every tick
    pub metabolic_cost: f64,
    /// Body radius
    pub size: f64,
}

/// Direction-decision thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Below this energy an organism is hungry
    pub hunger_threshold: f64,
    pub hungry_speed_multiplier: f64,
    pub hungry_vision_multiplier: f64,
    pub crowd_radius: f64,
    /// Crowded when strictly more neighbours than this are inside `crowd_radius`
    pub crowd_threshold: usize,
    /// Neighbours inside this radius form the centroid to flee from
    pub dispersal_radius: f64,
    /// Width of the zone along each edge
    pub edge_zone: f64,
    pub redirect_interval: u32,
    /// Ticks without a redirect before wandering widens
    pub restless_after: u32,
    /// Movement below this distance counts as stuck
    pub stuck_distance: f64,
    pub stuck_soft_limit: u32,
    pub stuck_hard_limit: u32,
    /// Wander spread near an edge, replacing `randomness * 2`
    pub edge_wander_spread: f64,
    /// Half-width of the jitter added to reflected headings
    pub reflection_jitter: f64,
    /// Follow compatible trails when nothing else drives the organism
    pub follow_trails: bool,
    pub trail_vision_cap: f64,
    /// Trail following is suppressed this close to an edge
    pub trail_edge_clearance: f64,
}

/// Sexual and asexual reproduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproductionConfig {
    pub mate_distance: f64,
    pub mate_energy: f64,
    pub mate_cost: f64,
    pub child_energy: f64,
    pub child_jitter: f64,
    /// Hue distance under which two organisms may mate
    pub hue_tolerance: f64,
    /// Allow organisms at full energy to split
    pub asexual_enabled: bool,
    pub asexual_threshold: f64,
    pub asexual_spread: f64,
}

/// Plant seeding and regrowth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantConfig {
    pub initial_count: usize,
    /// No regrowth at or above this many plants
    pub max_count: usize,
    /// Probability of a regrowth attempt per tick
    pub spawn_chance: f64,
    pub spawn_margin: f64,
    /// Rejected when an organism is this close on both axes
    pub organism_clearance: f64,
    pub spawn_attempts: u32,
    pub size: f64,
}

/// Trail field resolution and fading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailConfig {
    /// World units per grid cell
    pub cell_size: f64,
    /// Multiplier applied to every cell each tick
    pub decay_factor: f64,
    /// Intensities below this snap to zero
    pub snap_threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between stats snapshots
    pub stats_interval: u64,
    /// Stats snapshots kept in history
    pub history_len: usize,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 10.0,
            target_fps: 60.0,
        }
    }
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            initial_population: 20,
            spawn_margin: 50.0,
            initial_energy: 50.0,
            max_energy: 100.0,
            food_energy: 20.0,
            metabolic_cost: 0.1,
            size: 5.0,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            hunger_threshold: 50.0,
            hungry_speed_multiplier: 1.3,
            hungry_vision_multiplier: 1.5,
            crowd_radius: 30.0,
            crowd_threshold: 3,
            dispersal_radius: 50.0,
            edge_zone: 80.0,
            redirect_interval: 120,
            restless_after: 60,
            stuck_distance: 0.5,
            stuck_soft_limit: 30,
            stuck_hard_limit: 100,
            edge_wander_spread: 1.5,
            reflection_jitter: 0.25,
            follow_trails: false,
            trail_vision_cap: 80.0,
            trail_edge_clearance: 50.0,
        }
    }
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            mate_distance: 20.0,
            mate_energy: 60.0,
            mate_cost: 30.0,
            child_energy: 50.0,
            child_jitter: 5.0,
            hue_tolerance: 30.0,
            asexual_enabled: false,
            asexual_threshold: 100.0,
            asexual_spread: 10.0,
        }
    }
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            initial_count: 30,
            max_count: 50,
            spawn_chance: 0.1,
            spawn_margin: 30.0,
            organism_clearance: 20.0,
            spawn_attempts: 10,
            size: 3.0,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            decay_factor: 0.95,
            snap_threshold: 0.01,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 30,
            history_len: 200,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let w = &self.world;
        if !(w.width > 0.0 && w.height > 0.0) {
            return Err("world width and height must be > 0".to_string());
        }
        if w.margin < 0.0 || w.margin * 2.0 >= w.width.min(w.height) {
            return Err("margin must be >= 0 and smaller than half the world".to_string());
        }
        if w.target_fps <= 0.0 {
            return Err("target_fps must be > 0".to_string());
        }
        let o = &self.organisms;
        if o.initial_population == 0 {
            return Err("initial_population must be > 0".to_string());
        }
        if o.spawn_margin * 2.0 >= w.width.min(w.height) {
            return Err("organism spawn_margin must be smaller than half the world".to_string());
        }
        if self.plants.spawn_margin * 2.0 >= w.width.min(w.height) {
            return Err("plant spawn_margin must be smaller than half the world".to_string());
        }
        if !(0.0..=1.0).contains(&self.plants.spawn_chance) {
            return Err("plant spawn_chance must be between 0 and 1".to_string());
        }
        let t = &self.trails;
        if t.cell_size <= 0.0 {
            return Err("trail cell_size must be > 0".to_string());
        }
        if !(t.decay_factor > 0.0 && t.decay_factor < 1.0) {
            return Err("trail decay_factor must be between 0 and 1 (exclusive)".to_string());
        }
        if self.logging.stats_interval == 0 {
            return Err("stats_interval must be > 0".to_string());
        }
        Ok(())
    }

    /// Frame interval in milliseconds implied by `target_fps`
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.world.target_fps
    }
}
