//! Per-tick direction decision and movement.
//!
//! Each tick an organism classifies its situation (hunger, crowding, edge
//! proximity, visible food) and walks an ordered table of strategies; the
//! first one whose guard holds picks the heading. The guards are not
//! mutually exclusive: periodic redirect and crowd dispersal step aside when
//! a plant is visible, while stuck recovery does not.

use super::Organism;
use crate::config::Config;
use crate::plant::Plant;
use crate::random::RandomSource;
use crate::trail::{TrailField, TrailTarget};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI, TAU};

/// Minimum trail intensity worth considering
const TRAIL_SCAN_FLOOR: f64 = 0.3;
/// Minimum intensity of the strongest trail before it is followed
const TRAIL_FOLLOW_FLOOR: f64 = 0.5;
/// Velocity components below this count as no motion
const MIN_VELOCITY: f64 = 0.01;

/// The strategy that chose an organism's heading
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Drive {
    PeriodicRedirect,
    StuckRecovery,
    CrowdDispersal,
    FoodSeeking,
    HungrySearch,
    TrailFollowing,
    Wander,
}

/// Which edge zones an organism is inside
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeZones {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl EdgeZones {
    pub fn detect(x: f64, y: f64, width: f64, height: f64, zone: f64) -> Self {
        Self {
            left: x < zone,
            right: x > width - zone,
            top: y < zone,
            bottom: y > height - zone,
        }
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Every organism except the one being updated.
///
/// Built from the slices before and after it, so earlier organisms are seen
/// at their already-updated positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighborhood<'a> {
    before: &'a [Organism],
    after: &'a [Organism],
}

impl<'a> Neighborhood<'a> {
    pub fn new(before: &'a [Organism], after: &'a [Organism]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Organism> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What an organism perceives at the start of its decision
pub struct Situation<'a> {
    pub hungry: bool,
    pub crowded: bool,
    pub edges: EdgeZones,
    pub target: Option<&'a Plant>,
    pub trail: Option<TrailTarget>,
    pub neighbors: Neighborhood<'a>,
    pub config: &'a Config,
}

/// Movement state a strategy clears when it fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reset {
    Nothing,
    RedirectTimer,
    StuckCounter,
}

struct Strategy {
    drive: Drive,
    applies: fn(&Organism, &Situation<'_>) -> bool,
    steer: fn(&Organism, &Situation<'_>, &mut dyn RandomSource) -> f64,
    reset: Reset,
    /// Steer this tick only; the remembered heading is left alone
    keeps_heading: bool,
}

/// Evaluated top to bottom; first match wins. The last entry always applies.
static STRATEGIES: [Strategy; 7] = [
    Strategy {
        drive: Drive::PeriodicRedirect,
        applies: redirect_due,
        steer: random_heading,
        reset: Reset::RedirectTimer,
        keeps_heading: false,
    },
    Strategy {
        drive: Drive::StuckRecovery,
        applies: is_stuck,
        steer: inward_escape,
        reset: Reset::StuckCounter,
        keeps_heading: true,
    },
    Strategy {
        drive: Drive::CrowdDispersal,
        applies: crowded_without_food,
        steer: disperse,
        reset: Reset::Nothing,
        keeps_heading: false,
    },
    Strategy {
        drive: Drive::FoodSeeking,
        applies: food_visible,
        steer: seek_food,
        reset: Reset::Nothing,
        keeps_heading: false,
    },
    Strategy {
        drive: Drive::HungrySearch,
        applies: hungry,
        steer: hungry_search,
        reset: Reset::Nothing,
        keeps_heading: false,
    },
    Strategy {
        drive: Drive::TrailFollowing,
        applies: trail_sensed,
        steer: follow_trail,
        reset: Reset::Nothing,
        keeps_heading: false,
    },
    Strategy {
        drive: Drive::Wander,
        applies: always,
        steer: wander,
        reset: Reset::Nothing,
        keeps_heading: false,
    },
];

fn redirect_due(org: &Organism, s: &Situation<'_>) -> bool {
    org.direction_change_timer > s.config.behavior.redirect_interval && s.target.is_none()
}

fn is_stuck(org: &Organism, s: &Situation<'_>) -> bool {
    org.stuck_counter > s.config.behavior.stuck_soft_limit
}

fn crowded_without_food(_: &Organism, s: &Situation<'_>) -> bool {
    s.crowded && s.target.is_none()
}

fn food_visible(_: &Organism, s: &Situation<'_>) -> bool {
    s.target.is_some()
}

fn hungry(_: &Organism, s: &Situation<'_>) -> bool {
    s.hungry
}

fn trail_sensed(_: &Organism, s: &Situation<'_>) -> bool {
    s.trail.is_some()
}

fn always(_: &Organism, _: &Situation<'_>) -> bool {
    true
}

fn random_heading(_: &Organism, _: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    rng.angle()
}

/// Heading towards the centre for the first active edge zone, as a random
/// angle inside an inward-facing quarter circle. Fully random away from edges.
fn inward_escape(_: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    let e = s.edges;
    if e.left {
        rng.uniform(-FRAC_PI_4, FRAC_PI_4)
    } else if e.right {
        rng.uniform(3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4)
    } else if e.top {
        rng.uniform(FRAC_PI_4, 3.0 * FRAC_PI_4)
    } else if e.bottom {
        rng.uniform(-3.0 * FRAC_PI_4, -FRAC_PI_4)
    } else {
        rng.angle()
    }
}

/// Flee the centroid of neighbours inside the dispersal radius.
fn disperse(org: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    let radius = s.config.behavior.dispersal_radius;
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    for other in s.neighbors.iter() {
        if org.distance_to(other) < radius {
            sum_x += other.x;
            sum_y += other.y;
            count += 1;
        }
    }

    if count == 0 {
        return rng.angle();
    }
    let (cx, cy) = (sum_x / count as f64, sum_y / count as f64);
    (org.y - cy).atan2(org.x - cx)
}

fn seek_food(org: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    match s.target {
        Some(plant) => (plant.y - org.y).atan2(plant.x - org.x),
        None => rng.angle(),
    }
}

/// Escape edges towards the interior (corners towards the opposite
/// diagonal), otherwise swing anywhere around the current heading.
fn hungry_search(org: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    let e = s.edges;
    if !e.any() {
        return org.last_direction + rng.uniform(-PI, PI);
    }

    let escape = match (e.left, e.right, e.top, e.bottom) {
        (true, _, true, _) => FRAC_PI_4,
        (_, true, true, _) => 3.0 * FRAC_PI_4,
        (true, _, _, true) => -FRAC_PI_4,
        (_, true, _, true) => -3.0 * FRAC_PI_4,
        (true, _, _, _) => 0.0,
        (_, true, _, _) => PI,
        (_, _, true, _) => FRAC_PI_2,
        _ => -FRAC_PI_2,
    };
    escape + rng.uniform(-FRAC_PI_3, FRAC_PI_3)
}

fn follow_trail(org: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    match s.trail {
        Some(t) => (t.y - org.y).atan2(t.x - org.x),
        None => rng.angle(),
    }
}

fn wander(org: &Organism, s: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
    let b = &s.config.behavior;
    let mut spread = if s.edges.any() {
        b.edge_wander_spread
    } else {
        org.genes.randomness * 2.0
    };
    if org.direction_change_timer > b.restless_after {
        spread *= 1.5;
    }
    org.last_direction + rng.uniform(-spread, spread)
}

/// Wrap an angle into `[0, 2π)`
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

impl Organism {
    /// Advance one tick: decide a heading, move, pay metabolism and mark the
    /// trail field.
    pub fn advance(
        &mut self,
        plants: &[Plant],
        neighbors: Neighborhood<'_>,
        trails: &mut TrailField,
        config: &Config,
        rng: &mut dyn RandomSource,
    ) {
        let behavior = &config.behavior;

        self.age += 1;
        let moved = (self.x - self.last_x).hypot(self.y - self.last_y);
        if moved < behavior.stuck_distance {
            self.stuck_counter += 1;
        } else {
            self.stuck_counter = 0;
        }
        self.last_x = self.x;
        self.last_y = self.y;
        self.direction_change_timer += 1;

        let hungry = self.is_hungry(config);
        let situation = Situation {
            hungry,
            crowded: self.is_crowded(neighbors, config),
            edges: EdgeZones::detect(
                self.x,
                self.y,
                config.world.width,
                config.world.height,
                behavior.edge_zone,
            ),
            target: self.find_closest_plant(plants, config),
            trail: self.sense_trail(trails, config),
            neighbors,
            config,
        };

        let angle = self.choose_heading(&situation, rng);

        let speed = self.genes.speed
            * if hungry {
                behavior.hungry_speed_multiplier
            } else {
                1.0
            };
        let mut dx = angle.cos() * speed;
        let mut dy = angle.sin() * speed;
        if dx.abs() < MIN_VELOCITY && dy.abs() < MIN_VELOCITY {
            let fresh = rng.angle();
            dx = fresh.cos() * speed;
            dy = fresh.sin() * speed;
            self.last_direction = fresh;
        }

        self.apply_movement(dx, dy, config, rng);

        self.energy -= config.organisms.metabolic_cost;

        if self.stuck_counter > behavior.stuck_hard_limit {
            self.last_direction = rng.angle();
            self.stuck_counter = 0;
        }

        if !hungry {
            trails.mark(self.x, self.y, self.hue);
        }
    }

    /// Run the strategy table and record the winning heading
    fn choose_heading(&mut self, situation: &Situation<'_>, rng: &mut dyn RandomSource) -> f64 {
        let strategy = STRATEGIES
            .iter()
            .find(|s| (s.applies)(self, situation))
            .unwrap_or(&STRATEGIES[STRATEGIES.len() - 1]);

        let angle = (strategy.steer)(self, situation, rng);
        match strategy.reset {
            Reset::RedirectTimer => self.direction_change_timer = 0,
            Reset::StuckCounter => self.stuck_counter = 0,
            Reset::Nothing => {}
        }
        self.last_drive = Some(strategy.drive);
        if !strategy.keeps_heading {
            self.last_direction = normalize_angle(angle);
        }
        angle
    }

    /// Move by `(dx, dy)`, clamping to the margin and reflecting the heading
    /// off any wall that was hit
    fn apply_movement(&mut self, dx: f64, dy: f64, config: &Config, rng: &mut dyn RandomSource) {
        let margin = config.world.margin;
        let jitter = config.behavior.reflection_jitter;
        let (max_x, max_y) = (config.world.width - margin, config.world.height - margin);

        let mut new_x = self.x + dx;
        let mut new_y = self.y + dy;

        if new_x < margin || new_x > max_x {
            new_x = new_x.clamp(margin, max_x);
            self.last_direction = normalize_angle(PI - self.last_direction + rng.uniform(-jitter, jitter));
        }
        if new_y < margin || new_y > max_y {
            new_y = new_y.clamp(margin, max_y);
            self.last_direction = normalize_angle(-self.last_direction + rng.uniform(-jitter, jitter));
        }

        self.x = new_x;
        self.y = new_y;
    }

    /// Nearest plant within vision (widened when hungry). Ties keep the
    /// first plant found.
    pub fn find_closest_plant<'p>(&self, plants: &'p [Plant], config: &Config) -> Option<&'p Plant> {
        let mut closest_dist = self.vision_range(config);
        let mut closest = None;
        for plant in plants {
            let dist = plant.distance_to(self.x, self.y);
            if dist < closest_dist {
                closest = Some(plant);
                closest_dist = dist;
            }
        }
        closest
    }

    pub fn vision_range(&self, config: &Config) -> f64 {
        if self.is_hungry(config) {
            self.genes.vision * config.behavior.hungry_vision_multiplier
        } else {
            self.genes.vision
        }
    }

    /// More than `crowd_threshold` neighbours inside `crowd_radius`
    pub fn is_crowded(&self, neighbors: Neighborhood<'_>, config: &Config) -> bool {
        let b = &config.behavior;
        neighbors
            .iter()
            .filter(|other| self.distance_to(other) < b.crowd_radius)
            .count()
            > b.crowd_threshold
    }

    /// Strongest same-kind trail worth following, when trail following is on
    /// and the organism is clear of the edges
    fn sense_trail(&self, trails: &TrailField, config: &Config) -> Option<TrailTarget> {
        let b = &config.behavior;
        if !b.follow_trails {
            return None;
        }
        let clearance = EdgeZones::detect(
            self.x,
            self.y,
            config.world.width,
            config.world.height,
            b.trail_edge_clearance,
        );
        if clearance.any() {
            return None;
        }

        trails
            .strongest_near(
                self.x,
                self.y,
                self.genes.vision.min(b.trail_vision_cap),
                self.hue,
                config.reproduction.hue_tolerance,
                TRAIL_SCAN_FLOOR,
            )
            .filter(|t| t.intensity > TRAIL_FOLLOW_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{Genes, Hue};
    use crate::random::Scripted;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> Config {
        Config::default()
    }

    fn organism_at(id: u64, x: f64, y: f64, energy: f64) -> Organism {
        let mut rng = Scripted::midpoint();
        let genes = Genes::new(2.0, 40.0, 0.5);
        Organism::with_traits(id, x, y, energy, Hue::new(90.0), genes, &config(), &mut rng)
    }

    fn field() -> TrailField {
        let c = config();
        TrailField::for_world(c.world.width, c.world.height, 1.0)
    }

    fn step(org: &mut Organism, plants: &[Plant], others: &[Organism], trails: &mut TrailField) {
        let mut rng = Scripted::midpoint();
        org.advance(plants, Neighborhood::new(others, &[]), trails, &config(), &mut rng);
    }

    #[test]
    fn test_metabolic_cost_per_tick() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        let mut trails = field();
        for tick in 1..=10 {
            step(&mut org, &[], &[], &mut trails);
            assert!((org.energy - (80.0 - 0.1 * tick as f64)).abs() < 1e-9);
        }
        assert_eq!(org.age, 10);
    }

    #[test]
    fn test_food_seeking() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        let plants = [Plant::new(1, 400.0, 330.0)];
        let mut trails = field();

        step(&mut org, &plants, &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::FoodSeeking));
        assert!((org.last_direction - FRAC_PI_2).abs() < 1e-12);
        assert!((org.y - 302.0).abs() < 1e-9);
    }

    #[test]
    fn test_hunger_widens_vision() {
        let c = config();
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        let plants = [Plant::new(1, 450.0, 300.0)];
        assert!(org.find_closest_plant(&plants, &c).is_none());

        org.energy = 40.0;
        assert_eq!(org.find_closest_plant(&plants, &c).map(|p| p.id), Some(1));
    }

    #[test]
    fn test_closest_plant_ties_keep_first() {
        let c = config();
        let org = organism_at(1, 400.0, 300.0, 80.0);
        let plants = [
            Plant::new(1, 410.0, 300.0),
            Plant::new(2, 390.0, 300.0),
            Plant::new(3, 420.0, 300.0),
        ];
        assert_eq!(org.find_closest_plant(&plants, &c).map(|p| p.id), Some(1));
    }

    #[test]
    fn test_visible_food_beats_periodic_redirect() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        org.direction_change_timer = 500;
        let plants = [Plant::new(1, 420.0, 300.0)];
        let mut trails = field();

        step(&mut org, &plants, &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::FoodSeeking));
        assert_eq!(org.direction_change_timer, 501);
    }

    #[test]
    fn test_periodic_redirect_resets_timer() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        org.direction_change_timer = 120;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::PeriodicRedirect));
        assert_eq!(org.direction_change_timer, 0);
        assert!((org.last_direction - PI).abs() < 1e-12);
    }

    #[test]
    fn test_stuck_recovery_points_inward() {
        let mut org = organism_at(1, 50.0, 300.0, 80.0);
        org.stuck_counter = 30;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::StuckRecovery));
        assert_eq!(org.stuck_counter, 0);
        assert!((org.x - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_stuck_recovery_leaves_heading() {
        let mut org = organism_at(1, 50.0, 300.0, 80.0);
        org.last_direction = PI;
        org.stuck_counter = 30;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::StuckRecovery));
        assert!((org.x - 52.0).abs() < 1e-9);
        assert_eq!(org.last_direction, PI);

        // the next tick wanders around the old heading again
        step(&mut org, &[], &[], &mut trails);
        assert_eq!(org.last_drive, Some(Drive::Wander));
        assert!((org.last_direction - PI).abs() < 1e-12);
        assert!(org.x < 52.0);
    }

    #[test]
    fn test_stuck_recovery_beats_visible_food() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        org.stuck_counter = 40;
        let plants = [Plant::new(1, 420.0, 300.0)];
        let mut trails = field();

        step(&mut org, &plants, &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::StuckRecovery));
    }

    #[test]
    fn test_crowd_dispersal_flees_centroid() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        let others: Vec<Organism> = (0..4)
            .map(|i| organism_at(10 + i, 410.0, 295.0 + 3.0 * i as f64, 80.0))
            .collect();
        let mut trails = field();

        step(&mut org, &[], &others, &mut trails);

        assert_eq!(org.last_drive, Some(Drive::CrowdDispersal));
        assert!(org.x < 400.0);
    }

    #[test]
    fn test_three_neighbours_is_not_a_crowd() {
        let c = config();
        let org = organism_at(1, 400.0, 300.0, 80.0);
        let others: Vec<Organism> = (0..3).map(|i| organism_at(10 + i, 405.0, 300.0, 80.0)).collect();
        assert!(!org.is_crowded(Neighborhood::new(&others, &[]), &c));
    }

    #[test]
    fn test_visible_food_suppresses_dispersal() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        let others: Vec<Organism> = (0..5).map(|i| organism_at(10 + i, 405.0, 300.0, 80.0)).collect();
        let plants = [Plant::new(1, 400.0, 320.0)];
        let mut trails = field();

        step(&mut org, &plants, &others, &mut trails);

        assert_eq!(org.last_drive, Some(Drive::FoodSeeking));
    }

    #[test]
    fn test_hungry_corner_escape() {
        let mut org = organism_at(1, 30.0, 30.0, 40.0);
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::HungrySearch));
        assert!((org.last_direction - FRAC_PI_4).abs() < 1e-12);
        assert!(org.x > 30.0 && org.y > 30.0);
    }

    #[test]
    fn test_wander_keeps_heading_on_midpoint() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        org.last_direction = 1.0;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::Wander));
        assert!((org.last_direction - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wall_reflection() {
        let mut org = organism_at(1, 10.5, 300.0, 80.0);
        org.last_direction = PI;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.x, 10.0);
        assert!(org.last_direction.abs() < 1e-9 || (org.last_direction - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_hard_stuck_failsafe() {
        let mut org = organism_at(1, 400.0, 300.0, 80.0);
        org.stuck_counter = 150;
        org.direction_change_timer = 200;
        let mut trails = field();

        step(&mut org, &[], &[], &mut trails);

        assert_eq!(org.last_drive, Some(Drive::PeriodicRedirect));
        assert_eq!(org.stuck_counter, 0);
    }

    #[test]
    fn test_trail_written_only_when_fed() {
        let mut trails = field();
        let mut fed = organism_at(1, 400.0, 300.0, 80.0);
        step(&mut fed, &[], &[], &mut trails);
        assert_eq!(trails.intensity_at(fed.x, fed.y), 1.0);

        let mut hungry = organism_at(2, 200.0, 200.0, 40.0);
        step(&mut hungry, &[], &[], &mut trails);
        assert_eq!(trails.intensity_at(hungry.x, hungry.y), 0.0);
    }

    #[test]
    fn test_trail_following_when_enabled() {
        let mut c = config();
        c.behavior.follow_trails = true;
        let mut trails = TrailField::for_world(c.world.width, c.world.height, 10.0);
        trails.mark(405.0, 335.0, Hue::new(95.0));

        let mut org = organism_at(1, 405.0, 305.0, 80.0);
        let mut rng = Scripted::midpoint();
        org.advance(&[], Neighborhood::default(), &mut trails, &c, &mut rng);

        assert_eq!(org.last_drive, Some(Drive::TrailFollowing));
        assert!((org.last_direction - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_stays_inside_margin() {
        let c = config();
        let mut trails = field();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut org = organism_at(1, 15.0, 15.0, 1.0e6);
        org.genes = Genes::new(9.0, 40.0, 2.0);
        for _ in 0..2000 {
            org.advance(&[], Neighborhood::default(), &mut trails, &c, &mut rng);
            assert!(org.x >= 10.0 && org.x <= c.world.width - 10.0);
            assert!(org.y >= 10.0 && org.y <= c.world.height - 10.0);
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-12);
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(normalize_angle(0.0), 0.0);
    }
}
