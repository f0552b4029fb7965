//! Astro Drift headless host
//!
//! Runs the simulation with a scripted pilot and optionally streams one JSON
//! frame snapshot per line to stdout.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use astro_drift::sim::{Control, GameEvent, InputEvent};
use astro_drift::{JsonFileStore, MemoryStore, ScoreStore, Session, SimConfig};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "astro-drift")]
#[command(about = "Headless asteroid-field simulation driven by a scripted pilot")]
struct Cli {
    /// Number of frames to simulate
    #[arg(long, default_value_t = 900)]
    frames: u64,
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// JSON file with tuning overrides
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to keep the best score between runs (in memory if omitted)
    #[arg(long)]
    best_score_file: Option<PathBuf>,
    /// Pace frames in wall-clock time instead of running flat out
    #[arg(long)]
    realtime: bool,
    /// Print a JSON snapshot of every frame to stdout
    #[arg(long)]
    snapshots: bool,
}

/// Scripted inputs for one frame: circle, thrust in bursts, fire often
fn pilot(frame: u64, fps: u64) -> Vec<InputEvent> {
    let fps = fps.max(1);
    let mut events = Vec::new();

    match frame % (fps * 4) {
        0 => events.push(InputEvent::Pressed(Control::TurnLeft)),
        f if f == fps => events.push(InputEvent::Released(Control::TurnLeft)),
        f if f == fps * 2 => events.push(InputEvent::Pressed(Control::TurnRight)),
        f if f == fps * 3 => events.push(InputEvent::Released(Control::TurnRight)),
        _ => {}
    }

    match frame % (fps * 3) {
        0 => events.push(InputEvent::Pressed(Control::Thrust)),
        f if f == fps / 2 => events.push(InputEvent::Released(Control::Thrust)),
        _ => {}
    }

    match frame % 6 {
        0 => events.push(InputEvent::Pressed(Control::Fire)),
        3 => events.push(InputEvent::Released(Control::Fire)),
        _ => {}
    }

    events
}

fn run<S: ScoreStore>(cli: &Cli, config: SimConfig, store: S) -> Result<()> {
    let fps = u64::from(config.fps);
    let frame_time = Duration::from_secs_f64(1.0 / fps as f64);
    let mut session = Session::new(config, cli.seed, store);
    let mut out = BufWriter::new(io::stdout().lock());
    let mut games = 0u32;

    log::info!(
        "Running {} frames (seed {}, best score {})",
        cli.frames,
        cli.seed,
        session.state().best_score
    );

    for frame in 0..cli.frames {
        for event in pilot(frame, fps) {
            session.push_input(event);
        }

        for event in session.step() {
            if let GameEvent::GameOver { final_score } = event {
                games += 1;
                log::info!("Game {} over with score {}", games, final_score);
            }
        }

        if cli.snapshots {
            serde_json::to_writer(&mut out, &session.snapshot())
                .context("failed to write frame snapshot")?;
            writeln!(out).context("failed to write frame snapshot")?;
        }

        if cli.realtime {
            std::thread::sleep(frame_time);
        }
    }
    out.flush().context("failed to flush stdout")?;

    let state = session.state();
    log::info!(
        "Finished at level {} with score {} ({} lives, best {}, {} games over)",
        state.level + 1,
        state.score,
        state.lives,
        state.best_score,
        games
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };

    match &cli.best_score_file {
        Some(path) => {
            let store = JsonFileStore::open(path);
            log::info!("Keeping best score in {}", store.path().display());
            run(&cli, config, store)
        }
        None => run(&cli, config, MemoryStore::new()),
    }
}
