//! Play session
//!
//! Owns the level, the selected character and the running simulation. Frame
//! time is fed through a fixed-step accumulator so the simulation always
//! advances in `SIM_DT` steps regardless of display rate.

use crate::consts::*;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::settings::Settings;
use crate::sim::{
    GameEvent, Intent, LevelDescriptor, SimError, SimulationState, build_world, camera, tick,
};

/// A level being played with one character
#[derive(Debug, Clone)]
pub struct Session {
    level: LevelDescriptor,
    settings: Settings,
    character: String,
    state: SimulationState,
    accumulator: f32,
    /// Pending input; jump is one-shot and cleared once a tick consumes it
    input: Intent,
    high_scores: HighScores,
    /// Terminal score already handed to the leaderboard
    recorded: bool,
    last_rank: Option<usize>,
}

impl Session {
    /// Build the world for `character` and start running
    pub fn start(level: LevelDescriptor, settings: Settings, character: &str) -> Result<Self, SimError> {
        let state = fresh_state(&level, &settings, character)?;
        log::info!("Session started with '{character}'");
        Ok(Self {
            level,
            settings,
            character: character.to_string(),
            state,
            accumulator: 0.0,
            input: Intent::default(),
            high_scores: HighScores::new(),
            recorded: false,
            last_rank: None,
        })
    }

    /// Use an existing leaderboard
    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn level(&self) -> &LevelDescriptor {
        &self.level
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Leaderboard rank of the finished run, if it placed
    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Feed one display frame. Returns every event raised by the ticks run.
    pub fn advance(&mut self, frame_dt: f32, intent: Intent) -> Vec<GameEvent> {
        let dt = if frame_dt.is_finite() && frame_dt > 0.0 {
            frame_dt.min(MAX_FRAME_DT)
        } else {
            0.0
        };
        self.accumulator += dt;
        self.input.move_x = intent.move_x;
        self.input.jump |= intent.jump;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let output = tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.jump = false;

            events.extend(output.events);
        }

        // Capped frame: drop the backlog
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        if self.state.lifecycle.is_terminal() && !self.recorded {
            self.record_result();
        }
        events
    }

    fn record_result(&mut self) {
        self.recorded = true;
        let entry = HighScoreEntry {
            score: self.state.score,
            character: self.character.clone(),
            outcome: self.state.lifecycle,
            distance: self.state.player.pos.x,
        };
        self.last_rank = self.high_scores.add_score(entry);
        match self.last_rank {
            Some(rank) => log::info!("Run placed #{rank} with {} points", self.state.score),
            None => log::info!("Run finished with {} points", self.state.score),
        }
    }

    /// Start the level over with the same character
    pub fn restart(&mut self) -> Result<(), SimError> {
        let state = fresh_state(&self.level, &self.settings, &self.character)?;
        self.replace_state(state);
        log::info!("Session restarted");
        Ok(())
    }

    /// Switch character and restart. On error the current run is untouched.
    pub fn select_character(&mut self, character: &str) -> Result<(), SimError> {
        let state = fresh_state(&self.level, &self.settings, character)?;
        self.character = character.to_string();
        self.replace_state(state);
        log::info!("Selected '{character}'");
        Ok(())
    }

    fn replace_state(&mut self, state: SimulationState) {
        self.state = state;
        self.accumulator = 0.0;
        self.input = Intent::default();
        self.recorded = false;
        self.last_rank = None;
    }
}

fn fresh_state(level: &LevelDescriptor, settings: &Settings, character: &str) -> Result<SimulationState, SimError> {
    let mut state = build_world(level, character, settings)?;
    state.camera = camera::snap(&state.player, &state.settings);
    Ok(state)
}
