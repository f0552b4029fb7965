//! Host session: fixed-timestep driver around the simulation
//!
//! Owns the game state and the score store. Input arrives as discrete events
//! between frames and is applied at the start of the next tick.

use crate::config::SimConfig;
use crate::consts::MAX_SUBSTEPS;
use crate::highscores::ScoreStore;
use crate::sim::{FrameSnapshot, GameEvent, GameState, InputEvent, TickInput, tick};

/// Longest wall-clock gap accepted by a single `update`
const MAX_FRAME_DT: f32 = 0.25;

pub struct Session<S: ScoreStore> {
    state: GameState,
    store: S,
    accumulator: f32,
    pending: Vec<InputEvent>,
}

impl<S: ScoreStore> Session<S> {
    pub fn new(config: SimConfig, seed: u64, store: S) -> Self {
        let mut state = GameState::new(config, seed);
        state.best_score = store.best_score();
        Self {
            state,
            store,
            accumulator: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts and tests that need to stage a situation
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Queue an input event for the next frame
    pub fn push_input(&mut self, event: InputEvent) {
        self.pending.push(event);
    }

    /// Run exactly one frame. Returns the events it produced.
    pub fn step(&mut self) -> Vec<GameEvent> {
        let input = TickInput::new(self.pending.drain(..));
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        for event in &events {
            self.handle_event(event);
        }
        events
    }

    /// Advance by wall-clock time, running as many whole frames as fit.
    ///
    /// Large gaps are clamped and at most `MAX_SUBSTEPS` frames run per call.
    pub fn update(&mut self, dt_secs: f32) -> Vec<GameEvent> {
        let frame_dt = 1.0 / self.state.config.fps as f32;
        self.accumulator += dt_secs.clamp(0.0, MAX_FRAME_DT);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= frame_dt && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= frame_dt;
            substeps += 1;
        }

        // Drop backlog the substep cap could not absorb
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(frame_dt);
        }
        events
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.state)
    }

    fn handle_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::GameOver { final_score } => {
                if final_score > self.store.best_score() {
                    if let Err(err) = self.store.set_best_score(final_score) {
                        log::warn!("Failed to save best score {}: {}", final_score, err);
                    }
                }
                self.state.best_score = self.state.best_score.max(self.store.best_score());
            }
            GameEvent::LifeLost { lives_left } => {
                log::debug!("Life lost, {} left", lives_left);
            }
            GameEvent::LevelStarted { .. }
            | GameEvent::ObstacleDestroyed { .. }
            | GameEvent::CraftDestroyed => {}
        }
    }
}
