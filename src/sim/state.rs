//! Game state and core simulation types
//!
//! Everything the per-frame step reads or writes lives here. All per-frame
//! quantities (velocities, rates) are already divided by the frame rate.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::kinematics::{advance, wrap_point, wrap_toroidal};
use crate::config::SimConfig;
use crate::consts::{CRAFT_NOSE_FACTOR, CRAFT_START_HEADING};

/// Facing angle plus the trig values derived from it.
///
/// The cached values are only ever produced from the angle, so they cannot
/// drift out of sync with it. Serialized as the bare angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Heading {
    angle: f32,
    cos: f32,
    sin: f32,
}

impl Heading {
    pub fn new(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { angle, cos, sin }
    }

    /// Heading turned by `delta` radians (counter-clockwise on screen)
    pub fn rotated(self, delta: f32) -> Self {
        Self::new(self.angle + delta)
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn cos(&self) -> f32 {
        self.cos
    }

    #[inline]
    pub fn sin(&self) -> f32 {
        self.sin
    }

    #[inline]
    pub fn sin_minus_cos(&self) -> f32 {
        self.sin - self.cos
    }

    #[inline]
    pub fn sin_plus_cos(&self) -> f32 {
        self.sin + self.cos
    }

    /// Unit vector along the heading in screen space (y down)
    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.cos, -self.sin)
    }
}

impl From<f32> for Heading {
    fn from(angle: f32) -> Self {
        Self::new(angle)
    }
}

impl From<Heading> for f32 {
    fn from(heading: Heading) -> Self {
        heading.angle
    }
}

/// A laser bolt fired by the craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Total distance traveled so far
    pub dist: f32,
    /// Frames of impact flash left (0 while in flight)
    pub explode_timer: u32,
    /// Struck something during the current frame; the flash countdown
    /// starts on the next frame
    #[serde(skip)]
    fresh_impact: bool,
}

impl Projectile {
    /// Spawn a bolt just ahead of a craft at `origin` facing `heading`
    pub fn new(origin: Vec2, heading: Heading, config: &SimConfig) -> Self {
        let speed = config.laser_speed / config.fps as f32;
        Self {
            pos: origin + heading.direction() * config.laser_spawn_offset(),
            vel: heading.direction() * speed,
            dist: 0.0,
            explode_timer: 0,
            fresh_impact: false,
        }
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.explode_timer > 0
    }

    /// Move the bolt one frame. Exploding bolts stay where they hit.
    pub fn update(&mut self, config: &SimConfig) {
        if self.is_exploding() {
            return;
        }
        self.pos = advance(self.pos, self.vel);
        self.dist += self.vel.length();
        self.pos = wrap_point(self.pos, config.screen_width, config.screen_height);
    }

    /// Stop the bolt and start its impact flash
    pub fn strike(&mut self, flash_frames: u32) {
        self.explode_timer = flash_frames;
        self.fresh_impact = true;
    }

    /// Count the impact flash down one frame; true once it has run out
    pub fn tick_impact(&mut self) -> bool {
        if self.fresh_impact {
            self.fresh_impact = false;
            return false;
        }
        self.explode_timer = self.explode_timer.saturating_sub(1);
        self.explode_timer == 0
    }
}

/// Where the craft is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftPhase {
    /// Flying and controllable
    Active,
    /// Destroyed, explosion animation running
    Exploding,
    /// Explosion finished, waiting to be replaced
    Respawning,
}

/// The player's craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec2,
    heading: Heading,
    /// Angular rate in radians per frame (set by input)
    pub rot: f32,
    /// Velocity built up by thrusting
    pub thrust: Vec2,
    pub radius: f32,
    pub thrusting: bool,
    /// Re-armed when the fire control is released
    pub can_shoot: bool,
    pub dead: bool,
    /// Explosion frames left (0 unless dead)
    pub explode_timer: u32,
    /// Invulnerability blink half-cycles left
    pub blink_num: u32,
    /// Frames until the next blink toggle
    pub blink_time: u32,
    pub lasers: Vec<Projectile>,
}

impl Craft {
    /// Fresh craft at the center of the screen, pointing up, invulnerable
    pub fn new(config: &SimConfig) -> Self {
        Self {
            pos: Vec2::new(config.screen_width / 2.0, config.screen_height / 2.0),
            heading: Heading::new(CRAFT_START_HEADING),
            rot: 0.0,
            thrust: Vec2::ZERO,
            radius: config.craft_radius(),
            thrusting: false,
            can_shoot: true,
            dead: false,
            explode_timer: 0,
            blink_num: config.blink_count(),
            blink_time: config.blink_frames(),
            lasers: Vec::with_capacity(config.laser_max),
        }
    }

    #[inline]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn phase(&self) -> CraftPhase {
        match (self.dead, self.explode_timer) {
            (false, _) => CraftPhase::Active,
            (true, 0) => CraftPhase::Respawning,
            (true, _) => CraftPhase::Exploding,
        }
    }

    /// Still inside the post-spawn invulnerability window
    #[inline]
    pub fn is_blinking(&self) -> bool {
        self.blink_num > 0
    }

    /// Whether the hull should be drawn this frame
    pub fn is_visible(&self) -> bool {
        !self.dead && self.blink_num % 2 == 0
    }

    /// Advance an active craft by one frame
    pub fn update(&mut self, config: &SimConfig) {
        if self.rot != 0.0 {
            self.heading = self.heading.rotated(self.rot);
        }

        let fps = config.fps as f32;
        if self.thrusting {
            self.thrust += self.heading.direction() * config.craft_thrust / fps;
        } else {
            self.thrust -= config.craft_friction * self.thrust / fps;
        }

        self.pos = advance(self.pos, self.thrust);
        self.pos = wrap_toroidal(
            self.pos,
            self.radius,
            config.screen_width,
            config.screen_height,
        );

        if self.blink_num > 0 {
            self.blink_time = self.blink_time.saturating_sub(1);
            if self.blink_time == 0 {
                self.blink_time = config.blink_frames();
                self.blink_num -= 1;
            }
        }
    }

    /// Fire a laser. Returns false when on cooldown, at the cap, or dead.
    pub fn shoot(&mut self, config: &SimConfig) -> bool {
        if !self.can_shoot || self.lasers.len() >= config.laser_max || self.dead {
            return false;
        }
        self.lasers.push(Projectile::new(self.pos, self.heading, config));
        self.can_shoot = false;
        true
    }

    /// Blow the craft up and start the explosion timer
    pub fn destroy(&mut self, config: &SimConfig) {
        if self.dead {
            return;
        }
        self.explode_timer = config.craft_explode_frames().max(1);
        self.dead = true;
        self.thrusting = false;
        self.rot = 0.0;
    }

    /// Count the explosion down one frame; true on the frame it finishes
    pub fn tick_explosion(&mut self) -> bool {
        if self.explode_timer == 0 {
            return false;
        }
        self.explode_timer -= 1;
        self.explode_timer == 0
    }

    /// Tip of the hull, where lasers leave from
    pub fn nose(&self) -> Vec2 {
        self.pos + self.heading.direction() * (CRAFT_NOSE_FACTOR * self.radius)
    }

    /// Triangle outline: nose, rear left, rear right
    pub fn hull(&self) -> [Vec2; 3] {
        let h = self.heading;
        let r = self.radius;
        [
            self.nose(),
            Vec2::new(
                self.pos.x - r * (2.0 / 3.0 * h.sin_plus_cos()),
                self.pos.y + r * (2.0 / 3.0 * h.sin_minus_cos()),
            ),
            Vec2::new(
                self.pos.x + r * (2.0 / 3.0 * h.sin_minus_cos()),
                self.pos.y + r * (2.0 / 3.0 * h.sin_plus_cos()),
            ),
        ]
    }

    /// Thruster flame triangle behind the hull
    pub fn flame(&self) -> [Vec2; 3] {
        let h = self.heading;
        let r = self.radius;
        [
            Vec2::new(
                self.pos.x - r * (2.0 / 3.0 * h.cos() + 0.5 * h.sin()),
                self.pos.y + r * (2.0 / 3.0 * h.sin() - 0.5 * h.cos()),
            ),
            Vec2::new(
                self.pos.x - r * 5.0 / 3.0 * h.cos(),
                self.pos.y + r * 5.0 / 3.0 * h.sin(),
            ),
            Vec2::new(
                self.pos.x - r * (2.0 / 3.0 * h.cos() - 0.5 * h.sin()),
                self.pos.y + r * (2.0 / 3.0 * h.sin() + 0.5 * h.cos()),
            ),
        ]
    }
}

/// Obstacle size class, decided by radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleTier {
    Large,
    Medium,
    Small,
}

impl ObstacleTier {
    /// Classify a radius against the configured tier sizes
    pub fn of(radius: f32, config: &SimConfig) -> Self {
        if radius == config.large_radius() {
            ObstacleTier::Large
        } else if radius == config.medium_radius() {
            ObstacleTier::Medium
        } else {
            ObstacleTier::Small
        }
    }

    /// Score awarded for destroying an obstacle of this tier
    pub fn points(self, config: &SimConfig) -> u64 {
        match self {
            ObstacleTier::Large => config.points_large,
            ObstacleTier::Medium => config.points_medium,
            ObstacleTier::Small => config.points_small,
        }
    }

    /// Whether destroying this tier leaves two fragments behind
    pub fn splits(self) -> bool {
        self != ObstacleTier::Small
    }
}

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Rotation of the outline (radians)
    pub heading: f32,
    /// Per-vertex radius multipliers; the length is the vertex count
    pub offsets: Vec<f32>,
    /// Level it was spawned on (speed scaling)
    pub level: i32,
}

impl Obstacle {
    /// Random obstacle at `pos` with a jagged outline and drift velocity
    pub fn new(pos: Vec2, radius: f32, level: i32, config: &SimConfig, rng: &mut Pcg32) -> Self {
        let speed = config.obstacle_initial_speed * (1.0 + 0.1 * level as f32);
        let fps = config.fps as f32;

        let half = config.obstacle_max_vertices / 2;
        let vertices = rng.random_range(half..=half + config.obstacle_max_vertices) as usize;

        let drift = |rng: &mut Pcg32| {
            let magnitude = rng.random::<f32>() * speed / fps;
            if rng.random_bool(0.5) { magnitude } else { -magnitude }
        };
        let vel = Vec2::new(drift(rng), drift(rng));
        let heading = rng.random::<f32>() * TAU;

        let jag = config.obstacle_jag;
        let offsets = (0..vertices)
            .map(|_| 1.0 - jag + rng.random::<f32>() * 2.0 * jag)
            .collect();

        Self {
            pos,
            vel,
            radius,
            heading,
            offsets,
            level,
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn tier(&self, config: &SimConfig) -> ObstacleTier {
        ObstacleTier::of(self.radius, config)
    }

    /// Drift one frame
    pub fn update(&mut self, config: &SimConfig) {
        self.pos = advance(self.pos, self.vel);
        self.pos = wrap_toroidal(
            self.pos,
            self.radius,
            config.screen_width,
            config.screen_height,
        );
    }

    /// Outline vertices in screen space
    pub fn outline(&self) -> Vec<Vec2> {
        let n = self.vertex_count() as f32;
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let angle = self.heading + i as f32 * TAU / n;
                self.pos + Vec2::new(angle.cos(), angle.sin()) * self.radius * offset
            })
            .collect()
    }
}

/// Transient HUD text ("Level 3") that fades out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudMessage {
    pub text: String,
    /// Starts at 1.0 and decays every frame; may go negative
    pub opacity: f32,
}

/// Notable things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelStarted { level: i32 },
    ObstacleDestroyed { tier: ObstacleTier, points: u64 },
    CraftDestroyed,
    LifeLost { lives_left: u8 },
    GameOver { final_score: u64 },
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Current level index (-1 before the first level starts)
    pub level: i32,
    pub score: u64,
    pub lives: u8,
    /// Best score seen, kept in sync with the host's store
    pub best_score: u64,
    /// Frames simulated since construction
    pub frame: u64,
    pub craft: Craft,
    pub obstacles: Vec<Obstacle>,
    pub message: Option<HudMessage>,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game and start level 0
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut state = Self {
            craft: Craft::new(&config),
            lives: config.starting_lives,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: -1,
            score: 0,
            best_score: 0,
            frame: 0,
            obstacles: Vec::new(),
            message: None,
            events: Vec::new(),
        };

        super::tick::next_level(&mut state);

        state
    }

    /// Show a HUD message at full opacity
    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(HudMessage {
            text: text.into(),
            opacity: 1.0,
        });
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn test_heading_cache_follows_angle() {
        let heading = Heading::new(0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!((heading.cos() - 0.0).abs() < 1e-6);
        assert!((heading.sin() - 1.0).abs() < 1e-6);
        assert!((heading.sin_plus_cos() - 1.0).abs() < 1e-6);
        assert!((heading.sin_minus_cos() - 1.0).abs() < 1e-6);
        // Up the screen is negative y
        assert!((heading.direction() - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_heading_serializes_as_angle() {
        let json = serde_json::to_string(&Heading::new(1.25)).unwrap();
        assert_eq!(json, "1.25");
        let back: Heading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Heading::new(1.25));
    }

    #[test]
    fn test_new_craft_is_centered_and_invulnerable() {
        let craft = Craft::new(&config());
        assert_eq!(craft.pos, Vec2::new(380.0, 285.0));
        assert_eq!(craft.heading().angle(), CRAFT_START_HEADING);
        assert_eq!(craft.thrust, Vec2::ZERO);
        assert_eq!(craft.phase(), CraftPhase::Active);
        assert_eq!(craft.blink_num, 15);
        assert!(craft.is_blinking());
    }

    #[test]
    fn test_craft_rotation_updates_cache_in_update_step() {
        let config = config();
        let mut craft = Craft::new(&config);
        craft.rot = config.turn_rate();
        craft.update(&config);
        let expected = Heading::new(CRAFT_START_HEADING + config.turn_rate());
        assert_eq!(craft.heading(), expected);
    }

    #[test]
    fn test_thrust_then_friction_decays_without_stopping() {
        let config = config();
        let mut craft = Craft::new(&config);
        craft.thrusting = true;
        craft.update(&config);
        // Heading up: thrust accumulates in -y
        assert!((craft.thrust.y + config.craft_thrust / 30.0).abs() < 1e-6);
        assert!(craft.thrust.x.abs() < 1e-6);

        craft.thrusting = false;
        let before = craft.thrust.length();
        for _ in 0..60 {
            craft.update(&config);
        }
        let after = craft.thrust.length();
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn test_blink_cadence() {
        let config = config();
        let mut craft = Craft::new(&config);
        let blink_frames = config.blink_frames();
        for _ in 0..blink_frames - 1 {
            craft.update(&config);
        }
        assert_eq!(craft.blink_num, 15);
        craft.update(&config);
        assert_eq!(craft.blink_num, 14);
        assert_eq!(craft.blink_time, blink_frames);
        // Odd count hides the hull
        assert!(!craft.is_visible());

        for _ in 0..blink_frames * 14 {
            craft.update(&config);
        }
        assert_eq!(craft.blink_num, 0);
        assert!(craft.is_visible());
    }

    #[test]
    fn test_shoot_cooldown_cap_and_dead() {
        let config = config();
        let mut craft = Craft::new(&config);
        assert!(craft.shoot(&config));
        // Still held: cooldown
        assert!(!craft.shoot(&config));
        assert_eq!(craft.lasers.len(), 1);

        for _ in 1..config.laser_max {
            craft.can_shoot = true;
            assert!(craft.shoot(&config));
        }
        craft.can_shoot = true;
        assert!(!craft.shoot(&config));
        assert_eq!(craft.lasers.len(), config.laser_max);

        let mut craft = Craft::new(&config);
        craft.destroy(&config);
        assert!(!craft.shoot(&config));
        assert!(craft.lasers.is_empty());
    }

    #[test]
    fn test_laser_spawns_just_ahead_of_center() {
        let config = config();
        let mut craft = Craft::new(&config);
        craft.shoot(&config);
        let laser = &craft.lasers[0];
        assert!((laser.pos.distance(craft.pos) - 20.0 / 3.0).abs() < 1e-4);
        // Straight up the screen, well short of the hull tip
        assert!((laser.pos.x - craft.pos.x).abs() < 1e-4);
        assert!(laser.pos.y < craft.pos.y);
        assert!(laser.pos.distance(craft.pos) < craft.nose().distance(craft.pos));
        assert!((laser.vel.y + config.laser_speed / 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_explosion_timer_runs_exact_length() {
        let config = config();
        let mut craft = Craft::new(&config);
        craft.destroy(&config);
        assert_eq!(craft.phase(), CraftPhase::Exploding);

        let frames = config.craft_explode_frames();
        for frame in 1..=frames {
            assert!(craft.dead && craft.explode_timer > 0);
            let finished = craft.tick_explosion();
            assert_eq!(finished, frame == frames);
        }
        assert_eq!(craft.explode_timer, 0);
        assert_eq!(craft.phase(), CraftPhase::Respawning);
        // Further ticks never report a second finish
        assert!(!craft.tick_explosion());
    }

    #[test]
    fn test_projectile_stops_when_exploding() {
        let config = config();
        let mut laser = Projectile::new(Vec2::new(100.0, 100.0), Heading::new(0.0), &config);
        laser.update(&config);
        let dist = laser.dist;
        assert!(dist > 0.0);

        laser.strike(3);
        let pos = laser.pos;
        laser.update(&config);
        assert_eq!(laser.pos, pos);
        assert_eq!(laser.dist, dist);

        // Flash starts counting on the frame after the hit
        assert!(!laser.tick_impact());
        assert_eq!(laser.explode_timer, 3);
        assert!(!laser.tick_impact());
        assert!(!laser.tick_impact());
        assert!(laser.tick_impact());
    }

    #[test]
    fn test_obstacle_construction_ranges() {
        let config = config();
        let mut rng = Pcg32::seed_from_u64(7);
        for level in 0..5 {
            let obstacle = Obstacle::new(Vec2::ZERO, 50.0, level, &config, &mut rng);
            assert!((5..=15).contains(&obstacle.vertex_count()));
            let max_speed = 50.0 * (1.0 + 0.1 * level as f32) / 30.0;
            assert!(obstacle.vel.x.abs() <= max_speed);
            assert!(obstacle.vel.y.abs() <= max_speed);
            assert!((0.0..TAU).contains(&obstacle.heading));
            for offset in &obstacle.offsets {
                assert!(*offset >= 0.7 - 1e-5 && *offset <= 1.3 + 1e-5);
            }
            assert_eq!(obstacle.outline().len(), obstacle.vertex_count());
        }
    }

    #[test]
    fn test_tier_classification() {
        let config = config();
        assert_eq!(ObstacleTier::of(50.0, &config), ObstacleTier::Large);
        assert_eq!(ObstacleTier::of(25.0, &config), ObstacleTier::Medium);
        assert_eq!(ObstacleTier::of(12.5, &config), ObstacleTier::Small);
        assert_eq!(ObstacleTier::Large.points(&config), 20);
        assert!(!ObstacleTier::Small.splits());
    }

    #[test]
    fn test_new_state_starts_level_zero() {
        let state = GameState::new(config(), 42);
        assert_eq!(state.level, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.obstacles.len(), 3);
        assert_eq!(state.message.as_ref().map(|m| m.text.as_str()), Some("Level 1"));
    }
}
