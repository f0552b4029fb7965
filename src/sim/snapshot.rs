//! Per-frame drawable snapshot
//!
//! Plain value handed to whatever draws the frame. Built from the state after
//! a tick; nothing in here feeds back into the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Craft, GameState, HudMessage, Obstacle, Projectile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftView {
    pub pos: Vec2,
    /// Heading in radians
    pub heading: f32,
    pub radius: f32,
    /// Hull drawn this frame (false while dead or on an odd blink)
    pub visible: bool,
    /// Thruster flame drawn this frame
    pub flame_visible: bool,
    /// Explosion animation running
    pub exploding: bool,
    pub hull: [Vec2; 3],
    pub flame: [Vec2; 3],
}

impl From<&Craft> for CraftView {
    fn from(craft: &Craft) -> Self {
        let visible = craft.is_visible();
        Self {
            pos: craft.pos,
            heading: craft.heading().angle(),
            radius: craft.radius,
            visible,
            flame_visible: visible && craft.thrusting,
            exploding: craft.dead && craft.explode_timer > 0,
            hull: craft.hull(),
            flame: craft.flame(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub center: Vec2,
    pub radius: f32,
    pub heading: f32,
    pub offsets: Vec<f32>,
}

impl ObstacleView {
    pub fn vertex_count(&self) -> usize {
        self.offsets.len()
    }
}

impl From<&Obstacle> for ObstacleView {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            center: obstacle.pos,
            radius: obstacle.radius,
            heading: obstacle.heading,
            offsets: obstacle.offsets.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub exploding: bool,
}

impl From<&Projectile> for ProjectileView {
    fn from(laser: &Projectile) -> Self {
        Self {
            pos: laser.pos,
            exploding: laser.is_exploding(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub level: i32,
    pub craft: CraftView,
    pub obstacles: Vec<ObstacleView>,
    pub projectiles: Vec<ProjectileView>,
    pub score: u64,
    pub best_score: u64,
    pub lives: u8,
    /// Unclamped; the renderer clamps opacity for display
    pub message: Option<HudMessage>,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            frame: state.frame,
            level: state.level,
            craft: CraftView::from(&state.craft),
            obstacles: state.obstacles.iter().map(ObstacleView::from).collect(),
            projectiles: state
                .craft
                .lasers
                .iter()
                .map(ProjectileView::from)
                .collect(),
            score: state.score,
            best_score: state.best_score,
            lives: state.lives,
            message: state.message.clone(),
        }
    }
}
