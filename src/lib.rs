//! Astro Drift - an asteroid-field arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, game state)
//! - `config`: Data-driven game tuning loaded from JSON
//! - `highscores`: Best-score persistence behind a small store trait
//! - `session`: Host-side fixed-timestep driver owning one game

pub mod config;
pub mod highscores;
pub mod session;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use highscores::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
pub use session::Session;

/// Fixed constants that are not part of the tunable config
pub mod consts {
    /// Maximum frames simulated per host update to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Rejection-sampling budget when placing a new obstacle away from the craft
    pub const MAX_SPAWN_ATTEMPTS: u32 = 1024;

    /// Craft heading at spawn (pointing up the screen)
    pub const CRAFT_START_HEADING: f32 = std::f32::consts::FRAC_PI_2;

    /// Distance from craft center to its nose, as a multiple of the craft radius
    pub const CRAFT_NOSE_FACTOR: f32 = 4.0 / 3.0;

    /// Distance from craft center to where lasers appear, as a multiple of
    /// the craft size (20/3 px for a 30 px craft)
    pub const LASER_SPAWN_FACTOR: f32 = 2.0 / 9.0;
}

/// Convert a duration in seconds to a whole number of frames (rounded up)
#[inline]
pub fn frames_for(seconds: f32, fps: u32) -> u32 {
    ceil_ratio(seconds * fps as f32)
}

/// Round a positive ratio up to a whole count, ignoring f32 noise
/// (0.1 s at 30 fps is 3 frames, not 4)
#[inline]
pub fn ceil_ratio(value: f32) -> u32 {
    (value - 1e-4).ceil().max(0.0) as u32
}
