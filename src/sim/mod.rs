//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed frame per tick
//! - Seeded RNG only
//! - Stable iteration order (reverse index, so removals are safe)
//! - No rendering, input device or storage dependencies

pub mod kinematics;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use kinematics::{advance, circles_overlap, distance, wrap_point, wrap_toroidal};
pub use snapshot::{CraftView, FrameSnapshot, ObstacleView, ProjectileView};
pub use state::{
    Craft, CraftPhase, GameEvent, GameState, Heading, HudMessage, Obstacle, ObstacleTier,
    Projectile,
};
pub use tick::{
    Control, InputEvent, TickInput, apply_input, destroy_obstacle, laser_hit, next_level,
    restart_game, tick,
};
