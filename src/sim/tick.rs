//! Fixed-step simulation tick and session commands
//!
//! Core game loop that advances the track one step at a time. The host owns
//! the `GameState` and must not call `tick` and a command concurrently; the
//! state is single-writer and not reentrant.

use super::collision::{advance, cleanup, evaluate};
use super::ledger::{self, LedgerEvent};
use super::sequencer::SequencerStep;
use super::spawner::spawn;
use super::state::{GameState, GameStatus};
use crate::questions::Question;

/// One-shot intents collected by the host between ticks
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Lane the player steered to
    pub lane: Option<u8>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by one fixed step of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if let Some(lane) = input.lane {
        state.select_lane(lane);
    }
    if input.pause {
        state.toggle_pause();
    }

    if state.status != GameStatus::Playing {
        return;
    }

    state.time_ticks += 1;
    state.clock_ms += dt_ms;

    // 1. Move
    advance(&mut state.gates, &mut state.obstacles, state.speed);

    // 2. Collide
    let report = evaluate(
        &mut state.gates,
        &mut state.obstacles,
        state.selected_lane,
        state.tuning.collision_threshold,
    );

    // 3. Score (gate first, then obstacles; both apply)
    if let Some(resolution) = report.gate {
        ledger::apply(state, resolution.outcome.into());
    }
    for _ in &report.obstacle_hits {
        ledger::apply(state, LedgerEvent::ObstacleHit);
    }

    // 4. Sequence: expire elapsed holds, then start a hold for new outcomes
    let transition_ms = state.tuning.transition_delay_ms;
    for step in state.sequencer.advance(state.clock_ms, transition_ms) {
        if step == SequencerStep::FeedbackCleared {
            state.current_question_text.clear();
        }
    }
    if let Some(outcome) = report.visible_outcome() {
        let feedback_ms = state.tuning.feedback_duration_ms;
        state.sequencer.begin(outcome, state.clock_ms, feedback_ms);
    }

    // 5. Cleanup
    cleanup(
        &mut state.gates,
        &mut state.obstacles,
        state.tuning.cleanup_threshold,
    );

    // 6. Spawn
    if state.status == GameStatus::Playing {
        spawn(state);
    }
}

impl GameState {
    /// Leave the intro (or a finished run) and start playing
    pub fn start(&mut self) {
        match self.status {
            GameStatus::Intro | GameStatus::GameOver => {
                self.reset_run();
                log::info!(
                    "Game started (seed {}, {} questions)",
                    self.seed,
                    self.question_pool.len()
                );
            }
            GameStatus::Playing | GameStatus::Paused => {
                log::debug!("Start ignored: run already in progress");
            }
        }
    }

    /// Throw the current run away and start a fresh one
    pub fn restart(&mut self) {
        self.reset_run();
        log::info!("Game restarted");
    }

    /// Freeze or resume a run in progress
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            other => other,
        };
    }

    /// Steer to `lane`; out-of-range lanes are ignored
    pub fn select_lane(&mut self, lane: u8) {
        if crate::is_valid_lane(lane) {
            self.selected_lane = Some(lane);
        } else {
            log::warn!("Ignoring selection of lane {}", lane);
        }
    }

    /// Replace the question pool and forget which questions were shown
    pub fn load_question_pool(&mut self, questions: Vec<Question>) {
        log::info!("Loaded question pool ({} questions)", questions.len());
        self.question_pool = questions;
        self.used_question_ids.clear();
    }
}
