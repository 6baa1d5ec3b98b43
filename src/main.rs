//! Gap Dash entry point
//!
//! Headless demo: loads a level (or generates one), lets the autopilot play
//! it at a simulated 60 fps and reports the outcome.
//!
//! ```text
//! gap-dash [LEVEL.json] [--character KEY] [--seed N] [--settings SETTINGS.json]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use gap_dash::sim::{GameEvent, LevelConfig, LevelDescriptor, SimError, autopilot, generate_level};
use gap_dash::{HighScores, Session, Settings};

/// Display frame time fed to the session
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up after this much simulated time
const MAX_FRAMES: u32 = 60 * 300;

#[derive(Debug, Default)]
struct Args {
    level: Option<PathBuf>,
    settings: Option<PathBuf>,
    character: Option<String>,
    seed: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--character" => args.character = Some(iter.next().ok_or("--character needs a key")?),
            "--settings" => args.settings = Some(iter.next().ok_or("--settings needs a path")?.into()),
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a number")?;
                args.seed = value.parse().map_err(|e| format!("bad seed '{value}': {e}"))?;
            }
            _ if arg.starts_with("--") => return Err(format!("unknown option {arg}")),
            _ => args.level = Some(arg.into()),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), SimError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let level = match &args.level {
        Some(path) => LevelDescriptor::load(path)?,
        None => generate_level(&LevelConfig::default(), &settings, args.seed)?,
    };

    let character = match args.character {
        Some(key) => key,
        None => level
            .players
            .first()
            .map(|p| p.key.clone())
            .ok_or_else(|| SimError::config("level", "players", "roster is empty"))?,
    };

    let scores_path = std::env::temp_dir().join("gap_dash_highscores.json");
    let mut session = Session::start(level, settings, &character)?.with_high_scores(HighScores::load(&scores_path));

    let mut frames = 0;
    while session.state().is_running() && frames < MAX_FRAMES {
        let intent = autopilot(session.state());
        for event in session.advance(FRAME_DT, intent) {
            match event {
                GameEvent::PickedUpCoin { body_id, value } => log::debug!("coin {body_id} (+{value})"),
                GameEvent::Died { cause, score } => println!("Lost: {cause:?} with {score} points"),
                GameEvent::Won { score } => println!("Won with {score} points"),
            }
        }
        frames += 1;
    }

    let state = session.state();
    println!(
        "{}: {:?} at x={:.0} after {:.1}s, score {}",
        session.character(),
        state.lifecycle,
        state.player.pos.x,
        state.elapsed,
        state.score
    );
    if state.is_running() {
        log::warn!("Autopilot stalled after {frames} frames");
    }
    if let Some(rank) = session.last_rank() {
        println!("New high score, rank #{rank}");
    }
    if let Err(e) = session.high_scores().save(&scores_path) {
        log::warn!("Could not save high scores: {e}");
    }
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Gap Dash (native) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
