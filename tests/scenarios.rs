//! End-to-end gameplay scenarios driven through the public API

use astro_drift::sim::{
    Control, GameEvent, GameState, InputEvent, Obstacle, TickInput, distance, tick,
};
use astro_drift::{JsonFileStore, MemoryStore, ScoreStore, Session, SimConfig};
use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn still_obstacle(pos: Vec2, radius: f32, config: &SimConfig) -> Obstacle {
    let mut rng = Pcg32::seed_from_u64(99);
    let mut obstacle = Obstacle::new(pos, radius, 0, config, &mut rng);
    obstacle.vel = Vec2::ZERO;
    obstacle
}

fn idle() -> TickInput {
    TickInput::default()
}

#[test]
fn laser_splits_large_obstacle() {
    let mut state = GameState::new(SimConfig::default(), 11);
    let config = state.config.clone();

    // Craft sits at the center facing up; put one still obstacle in the line of fire
    state.obstacles.clear();
    let target = state.craft.pos - Vec2::new(0.0, 70.0);
    state.obstacles.push(still_obstacle(target, config.large_radius(), &config));

    tick(&mut state, &TickInput::new([InputEvent::Pressed(Control::Fire)]));
    assert_eq!(state.craft.lasers.len(), 1);
    assert_eq!(state.obstacles.len(), 1);

    let score_before = state.score;
    tick(&mut state, &idle());

    assert_eq!(state.obstacles.len(), 2);
    assert_eq!(state.score, score_before + 20);
    for fragment in &state.obstacles {
        assert_eq!(fragment.radius, config.medium_radius());
    }
    assert_eq!(state.craft.lasers.len(), 1);
    assert_eq!(state.craft.lasers[0].explode_timer, 3);

    // Flash runs out and the laser is removed
    for _ in 0..3 {
        tick(&mut state, &idle());
    }
    assert!(state.craft.lasers.is_empty());
}

#[test]
fn three_crashes_end_the_game_and_restart() {
    let mut state = GameState::new(SimConfig::default(), 12);
    let config = state.config.clone();
    state.drain_events();

    for expected_lives in [2u8, 1, 0] {
        state.craft.blink_num = 0;
        let craft_pos = state.craft.pos;
        state.obstacles.push(still_obstacle(craft_pos, config.large_radius(), &config));

        tick(&mut state, &idle());
        assert!(state.craft.dead);
        assert!(state.drain_events().contains(&GameEvent::CraftDestroyed));

        // Explosion lasts exactly one second of frames
        for _ in 0..config.craft_explode_frames() - 1 {
            tick(&mut state, &idle());
            assert!(state.craft.dead);
        }
        let score_at_crash = state.score;
        tick(&mut state, &idle());

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LifeLost {
            lives_left: expected_lives
        }));

        if expected_lives == 0 {
            assert!(events.contains(&GameEvent::GameOver {
                final_score: score_at_crash
            }));
            assert!(events.contains(&GameEvent::LevelStarted { level: 0 }));
            assert_eq!(state.best_score, score_at_crash);
        } else {
            assert_eq!(state.lives, expected_lives);
        }
        assert!(!state.craft.dead);
        assert!(state.craft.is_blinking());
    }

    assert_eq!(state.level, 0);
    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 3);
    assert_eq!(state.obstacles.len(), 3);
}

#[test]
fn cleared_field_starts_next_level_away_from_craft() {
    let mut state = GameState::new(SimConfig::default(), 13);
    let config = state.config.clone();
    let level = state.level;

    state.obstacles.clear();
    tick(&mut state, &idle());

    assert_eq!(state.level, level + 1);
    assert_eq!(
        state.obstacles.len() as u32,
        config.obstacle_base_count + state.level as u32
    );
    for obstacle in &state.obstacles {
        assert!(distance(obstacle.pos, state.craft.pos) >= config.spawn_clearance());
        assert_eq!(obstacle.radius, config.large_radius());
    }
    let message = state.message.as_ref().map(|m| m.text.as_str());
    assert_eq!(message, Some("Level 2"));
}

fn end_game<S: ScoreStore>(session: &mut Session<S>, score: u64) {
    let state = session.state_mut();
    state.score = score;
    state.lives = 1;
    state.craft.destroy(&state.config);
    state.craft.explode_timer = 1;
    session.step();
}

#[test]
fn best_score_written_only_when_beaten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best.json");

    let mut session = Session::new(SimConfig::default(), 14, JsonFileStore::open(&path));
    assert_eq!(session.state().best_score, 0);

    end_game(&mut session, 300);
    assert_eq!(session.state().best_score, 300);
    assert_eq!(JsonFileStore::open(&path).best_score(), 300);

    // A later session starts from the saved value
    let mut session = Session::new(SimConfig::default(), 15, JsonFileStore::open(&path));
    assert_eq!(session.state().best_score, 300);

    // Equal is not better
    std::fs::write(&path, r#"{"best_score":300}"#).unwrap();
    let before = std::fs::metadata(&path).unwrap().modified().unwrap();
    end_game(&mut session, 300);
    end_game(&mut session, 120);
    assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
    assert_eq!(session.state().best_score, 300);

    end_game(&mut session, 301);
    assert_eq!(JsonFileStore::open(&path).best_score(), 301);
}

#[test]
fn same_seed_and_inputs_replay_identically() {
    let script = |frame: u64| match frame % 10 {
        0 => vec![
            InputEvent::Pressed(Control::Fire),
            InputEvent::Pressed(Control::TurnLeft),
        ],
        5 => vec![
            InputEvent::Released(Control::Fire),
            InputEvent::Released(Control::TurnLeft),
        ],
        7 => vec![InputEvent::Pressed(Control::Thrust)],
        9 => vec![InputEvent::Released(Control::Thrust)],
        _ => Vec::new(),
    };

    let mut a = Session::new(SimConfig::default(), 77, MemoryStore::new());
    let mut b = Session::new(SimConfig::default(), 77, MemoryStore::new());
    for frame in 0..600 {
        for event in script(frame) {
            a.push_input(event);
            b.push_input(event);
        }
        assert_eq!(a.step(), b.step());
    }
    assert_eq!(a.snapshot(), b.snapshot());
}
