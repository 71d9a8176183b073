//! World simulation engine - main simulation loop.

use crate::config::Config;
use crate::events::{EventKind, Observers, SubscriptionId, WorldEvent, WorldObserver};
use crate::organism::{Neighborhood, Organism, OrganismId, OrganismSnapshot};
use crate::plant::{Plant, PlantId, PlantSnapshot};
use crate::random::RandomSource;
use crate::stats::{Stats, StatsHistory};
use crate::trail::TrailField;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Serializable view of the whole world between ticks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: u64,
    pub organisms: Vec<OrganismSnapshot>,
    pub plants: Vec<PlantSnapshot>,
    pub stats: Stats,
}

/// The simulation world
pub struct World {
    // Population
    pub organisms: Vec<Organism>,
    pub plants: Vec<Plant>,

    // Environment
    trails: TrailField,

    // State
    pub tick: u64,
    last_tick_at: f64,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    observers: Observers,

    // ID generation
    next_organism_id: OrganismId,
    next_plant_id: PlantId,

    // Random number generator (seeded for reproducibility)
    rng: Box<dyn RandomSource>,
    seed: Option<u64>,

    // Counters since the last stats snapshot
    births_since_stats: usize,
    deaths_since_stats: usize,
    eaten_since_stats: usize,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut world = Self::with_rng(config, Box::new(ChaCha8Rng::seed_from_u64(seed)));
        world.seed = Some(seed);
        world
    }

    /// Create a world driven by an arbitrary random source
    pub fn with_rng(config: Config, rng: Box<dyn RandomSource>) -> Self {
        let trails = TrailField::for_world(config.world.width, config.world.height, config.trails.cell_size);

        let mut world = Self {
            organisms: Vec::with_capacity(config.organisms.initial_population),
            plants: Vec::with_capacity(config.plants.max_count),
            trails,
            tick: 0,
            last_tick_at: 0.0,
            stats: Stats::new(),
            stats_history: StatsHistory::new(config.logging.history_len),
            config,
            observers: Observers::new(),
            next_organism_id: 0,
            next_plant_id: 0,
            rng,
            seed: None,
            births_since_stats: 0,
            deaths_since_stats: 0,
            eaten_since_stats: 0,
        };

        world.populate();
        world
    }

    /// Seed the initial organisms, then the plants around them. No events.
    fn populate(&mut self) {
        let (width, height) = (self.config.world.width, self.config.world.height);
        let margin = self.config.organisms.spawn_margin;

        for _ in 0..self.config.organisms.initial_population {
            let x = self.rng.uniform(margin, width - margin);
            let y = self.rng.uniform(margin, height - margin);
            let id = self.next_organism_id();
            let org = Organism::new(id, x, y, &self.config, &mut *self.rng);
            self.organisms.push(org);
        }

        for _ in 0..self.config.plants.initial_count {
            self.place_random_plant();
        }
    }

    /// Frame-limited tick for hosts driven by a wall clock.
    ///
    /// Returns false without doing any work if less than one frame interval
    /// has elapsed since the last tick.
    pub fn update(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_tick_at < self.config.frame_interval_ms() {
            return false;
        }
        self.last_tick_at = now_ms;
        self.step();
        true
    }

    /// Main simulation step
    pub fn step(&mut self) {
        self.tick += 1;

        // Phase 1: Fade trails
        self.trails
            .decay(self.config.trails.decay_factor, self.config.trails.snap_threshold);

        // Phase 2: Move and feed, in order
        self.move_organisms();

        // Phase 3: Remove dead organisms
        self.remove_dead();

        // Phase 4: Restart on extinction
        if self.organisms.is_empty() {
            self.reset();
        }

        // Phase 5: Handle reproduction
        self.handle_reproduction();

        // Phase 6: Regrow plants
        self.grow_plants();

        // Phase 7: Update statistics
        let interval = self.config.logging.stats_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.update_stats();
        }
    }

    fn move_organisms(&mut self) {
        for i in 0..self.organisms.len() {
            let (before, rest) = self.organisms.split_at_mut(i);
            let Some((organism, after)) = rest.split_first_mut() else {
                break;
            };

            organism.advance(
                &self.plants,
                Neighborhood::new(before, after),
                &mut self.trails,
                &self.config,
                &mut *self.rng,
            );

            if let Some(plant) = organism.try_to_eat(&mut self.plants, &self.config) {
                self.eaten_since_stats += 1;
                self.observers.emit(&WorldEvent::PlantEaten(plant.id));
            }
        }
    }

    fn remove_dead(&mut self) {
        let (dead, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut self.organisms)
            .into_iter()
            .partition(|o| o.is_dead());
        self.organisms = alive;

        for org in dead {
            log::trace!("organism {} died at age {}", org.id, org.age);
            self.deaths_since_stats += 1;
            self.observers.emit(&WorldEvent::OrganismDied(org.id));
        }
    }

    /// Discard the population and reseed from scratch
    fn reset(&mut self) {
        let extinct_at = self.tick;
        log::info!("Population extinct at tick {}, restarting", extinct_at);

        self.organisms.clear();
        self.plants.clear();
        self.trails.clear();
        self.tick = 0;
        self.births_since_stats = 0;
        self.deaths_since_stats = 0;
        self.eaten_since_stats = 0;

        self.populate();
        self.observers.emit(&WorldEvent::PopulationReset { tick: extinct_at });
    }

    fn handle_reproduction(&mut self) {
        let mut children = Vec::new();

        if self.config.reproduction.asexual_enabled {
            for i in 0..self.organisms.len() {
                let id = self.next_organism_id;
                if let Some(child) = self.organisms[i].maybe_reproduce(id, &self.config, &mut *self.rng) {
                    self.next_organism_id += 1;
                    children.push(child);
                }
            }
        }

        // Each organism mates at most once per tick, with the first willing
        // partner after it in the list
        let mate_energy = self.config.reproduction.mate_energy;
        for i in 0..self.organisms.len() {
            if self.organisms[i].energy < mate_energy {
                continue;
            }
            for j in (i + 1)..self.organisms.len() {
                if self.organisms[j].energy < mate_energy {
                    continue;
                }
                let (head, tail) = self.organisms.split_at_mut(j);
                let child = head[i].try_to_reproduce_with(
                    &mut tail[0],
                    self.next_organism_id,
                    &self.config,
                    &mut *self.rng,
                );
                if let Some(child) = child {
                    self.next_organism_id += 1;
                    children.push(child);
                    break;
                }
            }
        }

        for mut child in children {
            (child.x, child.y) = self.clamp_to_margin(child.x, child.y);
            log::trace!("organism {} born at ({:.1}, {:.1})", child.id, child.x, child.y);
            self.births_since_stats += 1;
            self.observers.emit(&WorldEvent::OrganismBorn(child.snapshot()));
            self.organisms.push(child);
        }
    }

    fn grow_plants(&mut self) {
        let params = &self.config.plants;
        if self.plants.len() >= params.max_count || !self.rng.chance(params.spawn_chance) {
            return;
        }
        if let Some(snapshot) = self.place_random_plant() {
            self.observers.emit(&WorldEvent::PlantGrown(snapshot));
        }
    }

    /// Try a few random spots away from organisms. Returns the new plant, if placed.
    fn place_random_plant(&mut self) -> Option<PlantSnapshot> {
        let (width, height) = (self.config.world.width, self.config.world.height);
        let params = &self.config.plants;
        let (margin, clearance, size) = (params.spawn_margin, params.organism_clearance, params.size);

        for _ in 0..params.spawn_attempts {
            let x = self.rng.uniform(margin, width - margin);
            let y = self.rng.uniform(margin, height - margin);

            let blocked = self
                .organisms
                .iter()
                .any(|o| (o.x - x).abs() < clearance && (o.y - y).abs() < clearance);
            if blocked {
                continue;
            }

            let plant = Plant::with_size(self.next_plant_id, x, y, size);
            self.next_plant_id += 1;
            let snapshot = plant.snapshot();
            self.plants.push(plant);
            return Some(snapshot);
        }

        None
    }

    fn update_stats(&mut self) {
        self.stats.tick = self.tick;
        self.stats.update(&self.organisms, self.plants.len());
        self.stats.births = std::mem::take(&mut self.births_since_stats);
        self.stats.deaths = std::mem::take(&mut self.deaths_since_stats);
        self.stats.plants_eaten = std::mem::take(&mut self.eaten_since_stats);

        log::debug!("{}", self.stats.summary());
        self.stats_history.record(self.stats.clone());
        self.observers.emit(&WorldEvent::StatsUpdate(self.stats.clone()));
    }

    fn clamp_to_margin(&self, x: f64, y: f64) -> (f64, f64) {
        let margin = self.config.world.margin;
        (
            x.clamp(margin, self.config.world.width - margin),
            y.clamp(margin, self.config.world.height - margin),
        )
    }

    fn next_organism_id(&mut self) -> OrganismId {
        let id = self.next_organism_id;
        self.next_organism_id += 1;
        id
    }

    /// Place an organism, clamped inside the margin
    pub fn add_organism(&mut self, x: f64, y: f64, energy: Option<f64>) -> OrganismId {
        let (x, y) = self.clamp_to_margin(x, y);
        let id = self.next_organism_id();
        let mut org = Organism::new(id, x, y, &self.config, &mut *self.rng);
        if let Some(energy) = energy {
            org.energy = energy;
        }

        self.observers.emit(&WorldEvent::OrganismBorn(org.snapshot()));
        self.organisms.push(org);
        id
    }

    /// Place a plant, clamped inside the margin
    pub fn add_plant(&mut self, x: f64, y: f64) -> PlantId {
        let (x, y) = self.clamp_to_margin(x, y);
        let id = self.next_plant_id;
        self.next_plant_id += 1;
        let plant = Plant::with_size(id, x, y, self.config.plants.size);

        self.observers.emit(&WorldEvent::PlantGrown(plant.snapshot()));
        self.plants.push(plant);
        id
    }

    /// Receive every event
    pub fn subscribe<O: WorldObserver + 'static>(&mut self, observer: O) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Receive events of one kind
    pub fn subscribe_to<O: WorldObserver + 'static>(&mut self, kind: EventKind, observer: O) -> SubscriptionId {
        self.observers.subscribe_to(kind, Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Full serializable state with freshly computed aggregates
    pub fn state(&self) -> WorldState {
        let mut stats = Stats::new();
        stats.tick = self.tick;
        stats.update(&self.organisms, self.plants.len());
        stats.births = self.births_since_stats;
        stats.deaths = self.deaths_since_stats;
        stats.plants_eaten = self.eaten_since_stats;

        WorldState {
            tick: self.tick,
            organisms: self.organisms.iter().map(Organism::snapshot).collect(),
            plants: self.plants.iter().map(Plant::snapshot).collect(),
            stats,
        }
    }

    /// Trail field, for renderers
    pub fn trails(&self) -> &TrailField {
        &self.trails
    }

    /// Run simulation for specified number of steps
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, steps: u64, mut callback: F)
    where
        F: FnMut(&World, u64),
    {
        for i in 0..steps {
            self.step();
            callback(self, i);
        }
    }

    /// Get current population count
    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    /// Get seed for reproducibility, if the world owns a seeded generator
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::Hue;
    use crate::random::Scripted;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Empty, quiet world: no seeding, no regrowth
    fn empty_config() -> Config {
        let mut config = Config::default();
        config.organisms.initial_population = 0;
        config.plants.initial_count = 0;
        config.plants.spawn_chance = 0.0;
        config
    }

    #[test]
    fn test_world_creation() {
        let config = Config::default();
        let world = World::new_with_seed(config.clone(), 42);

        assert_eq!(world.population(), config.organisms.initial_population);
        assert_eq!(world.plants.len(), config.plants.initial_count);
        assert_eq!(world.seed(), Some(42));

        let margin = config.organisms.spawn_margin;
        for org in &world.organisms {
            assert!(org.x >= margin && org.x <= config.world.width - margin);
            assert!(org.y >= margin && org.y <= config.world.height - margin);
        }
    }

    #[test]
    fn test_feeding_tick() {
        let mut world = World::new_with_seed(empty_config(), 1);
        world.add_organism(100.0, 100.0, Some(40.0));
        world.add_plant(102.0, 100.0);

        world.step();

        assert!(world.plants.is_empty());
        assert!((world.organisms[0].energy - 59.9).abs() < 1e-9);
    }

    #[test]
    fn test_mating_needs_energy() {
        let mut world = World::new_with_seed(empty_config(), 2);
        world.add_organism(100.0, 100.0, Some(59.0));
        world.add_organism(105.0, 100.0, Some(59.0));
        for org in &mut world.organisms {
            org.hue = Hue::new(100.0);
        }

        world.step();
        assert_eq!(world.population(), 2);
    }

    #[test]
    fn test_each_organism_mates_once_per_tick() {
        let mut world = World::new_with_seed(empty_config(), 3);
        world.add_organism(100.0, 100.0, Some(80.0));
        world.add_organism(104.0, 100.0, Some(80.0));
        world.add_organism(100.0, 104.0, Some(80.0));
        for org in &mut world.organisms {
            org.hue = Hue::new(100.0);
        }

        world.step();

        assert_eq!(world.population(), 4);
        assert!((world.organisms[0].energy - 49.9).abs() < 1e-9);
        assert!((world.organisms[1].energy - 49.9).abs() < 1e-9);
        assert!((world.organisms[2].energy - 79.9).abs() < 1e-9);
        assert_eq!(world.organisms[3].energy, 50.0);
    }

    #[test]
    fn test_asexual_split_in_world() {
        let mut config = empty_config();
        config.reproduction.asexual_enabled = true;
        let mut world = World::with_rng(config, Box::new(Scripted::new(&[0.0])));
        world.add_organism(12.0, 12.0, Some(100.5));
        world.add_organism(24.0, 12.0, Some(80.0));

        let born = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&born);
        world.subscribe_to(EventKind::OrganismBorn, move |e: &WorldEvent| {
            if let WorldEvent::OrganismBorn(snapshot) = e {
                sink.borrow_mut().push(snapshot.clone());
            }
        });

        world.step();

        assert_eq!(world.population(), 3);
        let (parent, partner, child) = (&world.organisms[0], &world.organisms[1], &world.organisms[2]);
        assert!((parent.energy - 50.2).abs() < 1e-9);
        assert_eq!(child.energy, parent.energy);
        assert_eq!((child.x, child.y), (10.0, 10.0));

        // the halved parent is below the mating threshold
        assert!((partner.energy - 79.9).abs() < 1e-9);

        let born = born.borrow();
        assert_eq!(born.len(), 1);
        assert_eq!(born[0].id, child.id);
        assert_eq!((born[0].x, born[0].y), (10.0, 10.0));
    }

    #[test]
    fn test_extinction_resets_world() {
        let mut config = Config::default();
        config.organisms.metabolic_cost = 1000.0;
        let mut world = World::new_with_seed(config, 4);

        let resets = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&resets);
        world.subscribe_to(EventKind::PopulationReset, move |e: &WorldEvent| {
            sink.borrow_mut().push(e.clone());
        });

        world.run(5);
        world.step();

        assert_eq!(world.population(), 20);
        assert!(world.plants.len() >= 30 && world.plants.len() <= 31);
        assert!(world.organisms.iter().all(|o| o.energy == 50.0));
        assert_eq!(world.tick, 0);
        assert_eq!(resets.borrow().len(), 6);
    }

    #[test]
    fn test_organisms_stay_inside_world() {
        let mut world = World::new_with_seed(Config::default(), 5);
        world.run(500);

        let config = &world.config;
        let margin = config.world.margin;
        for org in &world.organisms {
            assert!(org.x >= margin && org.x <= config.world.width - margin);
            assert!(org.y >= margin && org.y <= config.world.height - margin);
        }
    }

    #[test]
    fn test_reproducibility() {
        let mut a = World::new_with_seed(Config::default(), 12345);
        let mut b = World::new_with_seed(Config::default(), 12345);
        a.run(200);
        b.run(200);

        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_frame_limiter() {
        let mut world = World::new_with_seed(Config::default(), 6);

        assert!(!world.update(10.0));
        assert_eq!(world.tick, 0);
        assert!(world.update(20.0));
        assert!(!world.update(30.0));
        assert!(world.update(37.0));
        assert_eq!(world.tick, 2);
    }

    #[test]
    fn test_host_placement_clamped_and_announced() {
        let mut world = World::new_with_seed(empty_config(), 7);
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let sub = world.subscribe(move |e: &WorldEvent| sink.borrow_mut().push(e.kind()));

        let id = world.add_organism(-50.0, 5000.0, None);
        world.add_plant(3.0, 3.0);

        let org = &world.organisms[0];
        assert_eq!(org.id, id);
        assert_eq!((org.x, org.y), (10.0, 590.0));
        assert_eq!(org.energy, 50.0);
        assert_eq!((world.plants[0].x, world.plants[0].y), (10.0, 10.0));
        assert_eq!(*events.borrow(), vec![EventKind::OrganismBorn, EventKind::PlantGrown]);

        assert!(world.unsubscribe(sub));
        world.add_plant(100.0, 100.0);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_stats_every_interval() {
        let mut world = World::new_with_seed(Config::default(), 8);
        let updates = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&updates);
        world.subscribe_to(EventKind::StatsUpdate, move |e: &WorldEvent| {
            if let WorldEvent::StatsUpdate(stats) = e {
                sink.borrow_mut().push(stats.tick);
            }
        });

        world.run(60);

        assert_eq!(*updates.borrow(), vec![30, 60]);
        assert_eq!(world.stats_history.len(), 2);
        assert_eq!(world.stats.organism_count, world.population());
    }

    #[test]
    fn test_trails_decay_each_tick() {
        let mut world = World::new_with_seed(empty_config(), 9);
        world.add_organism(300.0, 300.0, Some(80.0));
        world.step();
        let fresh = world.trails().total_intensity();
        assert!(fresh > 0.0);

        world.organisms[0].energy = 10.0;
        world.organisms[0].x = 500.0;
        world.step();
        assert!(world.trails().total_intensity() <= fresh * 0.95 + 1e-9);
    }

    #[test]
    fn test_state_serializes() {
        let world = World::new_with_seed(Config::default(), 10);
        let state = world.state();
        assert_eq!(state.organisms.len(), 20);
        assert_eq!(state.plants.len(), 30);

        let json = serde_json::to_string(&state).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
