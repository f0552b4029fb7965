//! Fixed timestep simulation tick
//!
//! Advances the game by exactly one frame. Order within a frame:
//! input, craft, obstacles (with collisions), level transition, lasers, HUD.

use glam::Vec2;
use rand::Rng;

use super::kinematics::{circles_overlap, distance};
use super::state::{Craft, CraftPhase, GameEvent, GameState, Obstacle, Projectile};
use crate::consts::MAX_SPAWN_ATTEMPTS;

const SPAWN_FALLBACK_STEPS: u32 = 64;

/// Player controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    TurnLeft,
    TurnRight,
    Thrust,
    Fire,
}

/// A key/button edge from the input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(Control),
    Released(Control),
}

/// Input delivered since the previous frame, applied in order
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

/// Apply one input edge to the craft. Ignored while the craft is dead.
pub fn apply_input(state: &mut GameState, event: InputEvent) {
    let config = &state.config;
    let craft = &mut state.craft;
    if craft.dead {
        return;
    }

    match event {
        InputEvent::Pressed(Control::TurnLeft) => craft.rot = config.turn_rate(),
        InputEvent::Pressed(Control::TurnRight) => craft.rot = -config.turn_rate(),
        InputEvent::Released(Control::TurnLeft | Control::TurnRight) => craft.rot = 0.0,
        InputEvent::Pressed(Control::Thrust) => craft.thrusting = true,
        InputEvent::Released(Control::Thrust) => craft.thrusting = false,
        InputEvent::Pressed(Control::Fire) => {
            craft.shoot(config);
        }
        InputEvent::Released(Control::Fire) => craft.can_shoot = true,
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    for &event in &input.events {
        apply_input(state, event);
    }

    state.frame += 1;

    update_craft(state);
    update_obstacles(state);

    if state.obstacles.is_empty() {
        next_level(state);
    }

    update_lasers(state);

    let fade = state.config.text_fade_step();
    if let Some(message) = state.message.as_mut() {
        message.opacity -= fade;
    }
}

/// Craft phase: fly, or run the explosion down and replace the craft
fn update_craft(state: &mut GameState) {
    match state.craft.phase() {
        CraftPhase::Active => state.craft.update(&state.config),
        CraftPhase::Exploding => {
            if state.craft.tick_explosion() {
                lose_life(state);
            }
        }
        // Only reachable if a host forced the timer to zero by hand
        CraftPhase::Respawning => lose_life(state),
    }
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        restart_game(state);
    } else {
        log::debug!("Craft respawned, {} lives left", state.lives);
        state.craft = Craft::new(&state.config);
    }
}

/// Game over: settle the best score and start again from level 0
pub fn restart_game(state: &mut GameState) {
    let final_score = state.score;
    if final_score > state.best_score {
        log::debug!("New best score {} (was {})", final_score, state.best_score);
        state.best_score = final_score;
    }
    log::info!("Game over at level {} with score {}", state.level, final_score);
    state.events.push(GameEvent::GameOver { final_score });

    state.score = 0;
    state.lives = state.config.starting_lives;
    state.level = -1;
    state.obstacles.clear();
    state.craft = Craft::new(&state.config);
    next_level(state);
}

/// Obstacle phase: drift every obstacle and resolve its collisions.
///
/// Walks back to front so removing index `i` and appending fragments never
/// disturbs the indices still to be visited.
fn update_obstacles(state: &mut GameState) {
    let flash_frames = state.config.laser_explode_frames();

    for i in (0..state.obstacles.len()).rev() {
        state.obstacles[i].update(&state.config);

        if let Some(j) = laser_hit(&state.craft.lasers, &state.obstacles[i]) {
            state.craft.lasers[j].strike(flash_frames);
            destroy_obstacle(state, i);
            continue;
        }

        let craft = &state.craft;
        let obstacle = &state.obstacles[i];
        if !craft.dead
            && !craft.is_blinking()
            && circles_overlap(craft.pos, craft.radius, obstacle.pos, obstacle.radius)
        {
            log::debug!("Craft destroyed at ({:.1}, {:.1})", craft.pos.x, craft.pos.y);
            state.craft.destroy(&state.config);
            state.events.push(GameEvent::CraftDestroyed);
            destroy_obstacle(state, i);
        }
    }
}

/// Index of the last in-flight laser inside the obstacle, if any
pub fn laser_hit(lasers: &[Projectile], obstacle: &Obstacle) -> Option<usize> {
    lasers.iter().rposition(|laser| {
        !laser.is_exploding() && distance(laser.pos, obstacle.pos) < obstacle.radius
    })
}

/// Remove obstacle `index`, score it, and leave two fragments if it splits
pub fn destroy_obstacle(state: &mut GameState, index: usize) {
    let obstacle = state.obstacles.remove(index);
    let tier = obstacle.tier(&state.config);
    let points = tier.points(&state.config);

    if tier.splits() {
        let radius = obstacle.radius / 2.0;
        for _ in 0..2 {
            let fragment = Obstacle::new(
                obstacle.pos,
                radius,
                state.level,
                &state.config,
                &mut state.rng,
            );
            state.obstacles.push(fragment);
        }
    }

    state.score += points;
    state.events.push(GameEvent::ObstacleDestroyed { tier, points });
}

/// Start the next level with a fresh batch of large obstacles
pub fn next_level(state: &mut GameState) {
    state.level += 1;
    let level = state.level;
    let count = state.config.obstacle_base_count + level.max(0) as u32;
    let radius = state.config.large_radius();

    for _ in 0..count {
        let pos = spawn_point(state);
        let obstacle = Obstacle::new(pos, radius, level, &state.config, &mut state.rng);
        state.obstacles.push(obstacle);
    }

    log::info!("Level {} started with {} obstacles", level + 1, count);
    state.set_message(format!("Level {}", level + 1));
    state.events.push(GameEvent::LevelStarted { level });
}

/// Pick a random spawn point at least the spawn clearance away from the craft.
///
/// Rejection sampling with a fixed budget. If the budget runs out, the
/// farthest candidate seen slides toward the screen corner farthest from the
/// craft until it clears. That corner is always at least half the screen
/// diagonal away, which `SimConfig::validate` requires to exceed the clearance.
fn spawn_point(state: &mut GameState) -> Vec2 {
    let config = &state.config;
    let clearance = config.spawn_clearance();
    let craft_pos = state.craft.pos;

    let mut farthest = (craft_pos, -1.0);
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let candidate = Vec2::new(
            (state.rng.random::<f32>() * config.screen_width).floor(),
            (state.rng.random::<f32>() * config.screen_height).floor(),
        );
        let dist = distance(candidate, craft_pos);
        if dist >= clearance {
            return candidate;
        }
        if dist > farthest.1 {
            farthest = (candidate, dist);
        }
    }

    let corner = Vec2::new(
        far_edge(craft_pos.x, config.screen_width),
        far_edge(craft_pos.y, config.screen_height),
    );
    log::debug!(
        "No spawn point {} px from the craft after {} attempts, sliding toward ({}, {})",
        clearance,
        MAX_SPAWN_ATTEMPTS,
        corner.x,
        corner.y
    );
    for step in 1..=SPAWN_FALLBACK_STEPS {
        let candidate = farthest.0.lerp(corner, step as f32 / SPAWN_FALLBACK_STEPS as f32);
        if distance(candidate, craft_pos) >= clearance {
            return candidate;
        }
    }

    log::warn!(
        "Spawn clearance {} px cannot be met on a {}x{} screen",
        clearance,
        config.screen_width,
        config.screen_height
    );
    corner
}

/// Screen edge on the far side of `value` along one axis
#[inline]
fn far_edge(value: f32, extent: f32) -> f32 {
    if value < extent / 2.0 { extent } else { 0.0 }
}

/// Laser phase: cull spent lasers, move the rest
fn update_lasers(state: &mut GameState) {
    let max_dist = state.config.laser_max_dist();
    let lasers = &mut state.craft.lasers;

    for j in (0..lasers.len()).rev() {
        if lasers[j].dist > max_dist {
            lasers.remove(j);
            continue;
        }
        if lasers[j].is_exploding() {
            if lasers[j].tick_impact() {
                lasers.remove(j);
            }
            continue;
        }
        lasers[j].update(&state.config);
    }
}
