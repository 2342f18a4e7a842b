//! Score, lives and speed bookkeeping

use super::state::{GameState, GameStatus, Outcome};

/// A scoring-relevant event from the collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEvent {
    CorrectGate,
    WrongGate,
    ObstacleHit,
}

impl From<Outcome> for LedgerEvent {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Correct => LedgerEvent::CorrectGate,
            Outcome::Wrong => LedgerEvent::WrongGate,
        }
    }
}

/// Apply one event. Once the game is over, further events in the same tick
/// are ignored.
pub fn apply(state: &mut GameState, event: LedgerEvent) {
    if state.status == GameStatus::GameOver {
        return;
    }

    match event {
        LedgerEvent::CorrectGate => {
            let bonus = (state.speed * state.tuning.speed_bonus_factor).floor().max(0.0) as u64;
            state.score += state.tuning.base_points + bonus;
            state.speed += state.tuning.speed_increment;
            state.stats.correct += 1;
            state.stats.total += 1;
        }
        LedgerEvent::WrongGate => {
            state.score = state.score.saturating_sub(state.tuning.penalty);
            state.stats.total += 1;
            lose_life(state);
        }
        LedgerEvent::ObstacleHit => lose_life(state),
    }
    state.stats.recompute_accuracy();
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    if state.lives == 0 {
        state.status = GameStatus::GameOver;
        log::info!(
            "Game over: score {}, {}/{} correct",
            state.score,
            state.stats.correct,
            state.stats.total
        );
    }
}
