//! Simulation tuning
//!
//! Every constant the simulation reads is held here and fixed at construction.
//! Loaded from JSON on disk; missing fields fall back to the defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::LASER_SPAWN_FACTOR;
use crate::{ceil_ratio, frames_for};

/// Errors raised while loading or validating a [`SimConfig`]
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config field `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Simulation tuning. Durations are in seconds, speeds in pixels per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Frames per second the simulation is stepped at
    pub fps: u32,
    pub screen_width: f32,
    pub screen_height: f32,

    // === Obstacles ===
    /// Obstacles in the level-0 batch (level N spawns `base + N`)
    pub obstacle_base_count: u32,
    /// Diameter of a large obstacle
    pub obstacle_size: f32,
    pub obstacle_initial_speed: f32,
    /// Outline jaggedness (0 = regular polygon)
    pub obstacle_jag: f32,
    pub obstacle_max_vertices: u32,
    pub points_large: u64,
    pub points_medium: u64,
    pub points_small: u64,

    // === Craft ===
    /// Craft diameter
    pub craft_size: f32,
    /// Turn speed as percent of a half turn per second
    pub craft_turn_speed: f32,
    pub craft_thrust: f32,
    /// Fraction of velocity shed per second while coasting
    pub craft_friction: f32,
    pub craft_explode_duration: f32,
    pub craft_invulnerability_duration: f32,
    pub craft_blink_duration: f32,
    pub starting_lives: u8,

    // === Lasers ===
    pub laser_max: usize,
    pub laser_speed: f32,
    /// Travel cutoff as a fraction of screen width
    pub laser_max_dist_fraction: f32,
    pub laser_explode_duration: f32,

    // === HUD ===
    pub text_fade_time: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            screen_width: 760.0,
            screen_height: 570.0,

            obstacle_base_count: 3,
            obstacle_size: 100.0,
            obstacle_initial_speed: 50.0,
            obstacle_jag: 0.3,
            obstacle_max_vertices: 10,
            points_large: 20,
            points_medium: 50,
            points_small: 100,

            craft_size: 30.0,
            craft_turn_speed: 180.0,
            craft_thrust: 5.0,
            craft_friction: 0.7,
            craft_explode_duration: 1.0,
            craft_invulnerability_duration: 3.0,
            craft_blink_duration: 0.2,
            starting_lives: 3,

            laser_max: 10,
            laser_speed: 500.0,
            laser_max_dist_fraction: 0.8,
            laser_explode_duration: 0.1,

            text_fade_time: 2.5,
        }
    }
}

impl SimConfig {
    /// Load and validate a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse and validate a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config describes a playable simulation.
    ///
    /// Besides positivity, the obstacle spawn clearance must fit on screen:
    /// a craft parked at the center has to leave some point farther away than
    /// the clearance, otherwise placing a level batch could never succeed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.fps == 0 {
            return Err(invalid("fps", "must be at least 1"));
        }
        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("obstacle_size", self.obstacle_size),
            ("craft_size", self.craft_size),
            ("laser_speed", self.laser_speed),
            ("laser_max_dist_fraction", self.laser_max_dist_fraction),
            ("craft_explode_duration", self.craft_explode_duration),
            ("craft_blink_duration", self.craft_blink_duration),
            ("laser_explode_duration", self.laser_explode_duration),
            ("text_fade_time", self.text_fade_time),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(0.0..1.0).contains(&self.obstacle_jag) {
            return Err(invalid("obstacle_jag", "must be in [0, 1)"));
        }
        if self.obstacle_max_vertices < 2 {
            return Err(invalid("obstacle_max_vertices", "must be at least 2"));
        }
        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "must be at least 1"));
        }
        if self.laser_max == 0 {
            return Err(invalid("laser_max", "must be at least 1"));
        }

        let half_diagonal = self.screen_width.hypot(self.screen_height) / 2.0;
        if self.spawn_clearance() >= half_diagonal {
            return Err(invalid(
                "obstacle_size",
                format!(
                    "spawn clearance {} cannot be met on a {}x{} screen",
                    self.spawn_clearance(),
                    self.screen_width,
                    self.screen_height
                ),
            ));
        }
        Ok(())
    }

    /// Radius of a large obstacle
    pub fn large_radius(&self) -> f32 {
        (self.obstacle_size / 2.0).ceil()
    }

    pub fn medium_radius(&self) -> f32 {
        self.large_radius() / 2.0
    }

    pub fn small_radius(&self) -> f32 {
        self.large_radius() / 4.0
    }

    pub fn craft_radius(&self) -> f32 {
        self.craft_size / 2.0
    }

    /// Distance from craft center to where lasers spawn
    pub fn laser_spawn_offset(&self) -> f32 {
        LASER_SPAWN_FACTOR * self.craft_size
    }

    /// Minimum distance between the craft and a freshly spawned obstacle
    pub fn spawn_clearance(&self) -> f32 {
        self.obstacle_size * 2.0 + self.craft_radius()
    }

    /// Craft angular rate per frame while a turn key is held
    pub fn turn_rate(&self) -> f32 {
        self.craft_turn_speed / 100.0 * std::f32::consts::PI / self.fps as f32
    }

    pub fn craft_explode_frames(&self) -> u32 {
        frames_for(self.craft_explode_duration, self.fps)
    }

    pub fn blink_frames(&self) -> u32 {
        frames_for(self.craft_blink_duration, self.fps)
    }

    /// Number of blink half-cycles a freshly spawned craft starts with
    pub fn blink_count(&self) -> u32 {
        ceil_ratio(self.craft_invulnerability_duration / self.craft_blink_duration)
    }

    pub fn laser_explode_frames(&self) -> u32 {
        frames_for(self.laser_explode_duration, self.fps)
    }

    /// Travel distance after which a laser is culled
    pub fn laser_max_dist(&self) -> f32 {
        self.laser_max_dist_fraction * self.screen_width
    }

    /// Opacity lost by the HUD message each frame
    pub fn text_fade_step(&self) -> f32 {
        1.0 / (self.text_fade_time * self.fps as f32)
    }
}
