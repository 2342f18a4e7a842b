//! Game state and core simulation types
//!
//! Everything the presentation layer reads each frame lives here. The state
//! serializes to a JSON snapshot; the RNG and the question pool stay private
//! to the simulation.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::sequencer::Sequencer;
use crate::questions::Question;
use crate::tuning::Tuning;

/// Outer session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Title screen, waiting for start
    Intro,
    /// Active gameplay
    Playing,
    /// Gameplay frozen; resumes where it left off
    Paused,
    /// Lives exhausted; only restart leaves this phase
    GameOver,
}

/// Result of driving through a gate (or into an obstacle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Wrong,
}

impl Outcome {
    /// Merge two outcomes resolved in the same tick; a wrong result wins
    pub fn combine(self, other: Outcome) -> Outcome {
        if self == Outcome::Wrong || other == Outcome::Wrong {
            Outcome::Wrong
        } else {
            Outcome::Correct
        }
    }
}

/// Obstacle look (no gameplay difference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Barrier,
    Cone,
    Hazard,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Barrier, ObstacleKind::Cone, ObstacleKind::Hazard];
}

/// A gate spanning all lanes, one answer option per lane
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gate {
    pub id: u32,
    pub question_id: u32,
    pub question_text: String,
    pub options: [String; crate::consts::OPTION_COUNT],
    pub correct_lane: u8,
    pub track_position: f64,
    /// Set exactly once, the tick the gate reaches the player
    pub resolved: bool,
}

impl Gate {
    pub fn from_question(id: u32, question: &Question, track_position: f64) -> Self {
        Self {
            id,
            question_id: question.id,
            question_text: question.text.clone(),
            options: question.options.clone(),
            correct_lane: question.correct_option,
            track_position,
            resolved: false,
        }
    }
}

/// A single-lane hazard that costs a life when driven into
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub id: u32,
    pub lane: u8,
    pub track_position: f64,
    pub kind: ObstacleKind,
    pub hit: bool,
    pub resolved: bool,
}

/// Answer statistics (obstacles are not answers)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub correct: u32,
    pub total: u32,
    /// Rounded percentage of correct answers
    pub accuracy: u32,
}

impl Stats {
    pub fn recompute_accuracy(&mut self) {
        self.accuracy = if self.total > 0 {
            (100.0 * self.correct as f64 / self.total as f64).round() as u32
        } else {
            0
        };
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub status: GameStatus,
    pub score: u64,
    pub lives: u8,
    /// Track units per tick
    pub speed: f64,
    pub selected_lane: Option<u8>,
    /// Live gates in spawn order
    pub gates: Vec<Gate>,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub stats: Stats,
    pub sequencer: Sequencer,
    /// Question ids shown since the pool was last exhausted
    pub used_question_ids: BTreeSet<u32>,
    #[serde(skip)]
    pub question_pool: Vec<Question>,
    /// Text of the question currently on screen (empty between questions)
    pub current_question_text: String,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated milliseconds spent playing (frozen while paused)
    pub clock_ms: f64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a session on the intro screen with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            status: GameStatus::Intro,
            score: 0,
            lives: tuning.starting_lives,
            speed: tuning.base_speed,
            selected_lane: Some(tuning.starting_lane),
            gates: Vec::new(),
            obstacles: Vec::new(),
            stats: Stats::default(),
            sequencer: Sequencer::default(),
            used_question_ids: BTreeSet::new(),
            question_pool: Vec::new(),
            current_question_text: String::new(),
            time_ticks: 0,
            clock_ms: 0.0,
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Reset every per-run field; pool, tuning, RNG and id counter carry over
    pub(crate) fn reset_run(&mut self) {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.speed = self.tuning.base_speed;
        self.selected_lane = Some(self.tuning.starting_lane);
        self.gates.clear();
        self.obstacles.clear();
        self.stats = Stats::default();
        self.sequencer = Sequencer::default();
        self.used_question_ids.clear();
        self.current_question_text.clear();
        self.time_ticks = 0;
        self.clock_ms = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Gates spawned but not yet driven through
    pub fn unresolved_gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter().filter(|g| !g.resolved)
    }

    /// Snapshot for the presentation layer
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_waits_on_intro() {
        let state = GameState::new(7);
        assert_eq!(state.status, GameStatus::Intro);
        assert_eq!(state.lives, 3);
        assert_eq!(state.selected_lane, Some(1));
        assert!(state.gates.is_empty());
    }

    #[test]
    fn accuracy_rounds_half_up() {
        let mut stats = Stats {
            correct: 1,
            total: 8,
            accuracy: 0,
        };
        stats.recompute_accuracy();
        assert_eq!(stats.accuracy, 13); // 12.5

        stats = Stats::default();
        stats.recompute_accuracy();
        assert_eq!(stats.accuracy, 0);
    }

    #[test]
    fn wrong_outcome_dominates() {
        assert_eq!(Outcome::Correct.combine(Outcome::Wrong), Outcome::Wrong);
        assert_eq!(Outcome::Wrong.combine(Outcome::Correct), Outcome::Wrong);
        assert_eq!(Outcome::Correct.combine(Outcome::Correct), Outcome::Correct);
    }

    #[test]
    fn snapshot_uses_camel_case_and_hides_pool() {
        let mut state = GameState::new(1);
        state.question_pool = crate::questions::builtin();
        let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "intro");
        assert!(json.get("currentQuestionText").is_some());
        assert!(json.get("questionPool").is_none());
        assert!(json.get("rng").is_none());
    }
}
