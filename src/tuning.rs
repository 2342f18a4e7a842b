//! Game balance tuning
//!
//! Every gameplay constant lives here so a host can load a different balance
//! from JSON without touching the simulation. Track positions use a 0-100
//! scale where the player sits near 100.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning values
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(String),
    #[error("base speed must be positive (got {0})")]
    NonPositiveSpeed(f64),
    #[error("speed increment must not be negative (got {0})")]
    NegativeIncrement(f64),
    #[error("{name} must not be negative (got {value})")]
    NegativeDuration { name: &'static str, value: f64 },
    #[error("track positions out of order: spawn {spawn} < collision {collision} < cleanup {cleanup} required")]
    TrackOrder {
        spawn: f64,
        collision: f64,
        cleanup: f64,
    },
    #[error("obstacle spawn chance must be within [0, 1] (got {0})")]
    Probability(f64),
    #[error("starting lives must be at least 1")]
    NoLives,
    #[error("starting lane {0} is not on the track")]
    StartingLane(u8),
}

/// Gameplay balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Motion ===
    /// Track units a gate travels per tick at the start of a run
    pub base_speed: f64,
    /// Speed added after every correct answer
    pub speed_increment: f64,
    /// Gap the previous gate must have travelled before the next spawns
    pub spawn_distance: f64,
    /// Where new gates and obstacles appear (negative = beyond the horizon)
    pub spawn_pos_gate: f64,
    /// Position at which a gate or obstacle meets the player
    pub collision_threshold: f64,
    /// Position past which entities leave the track
    pub cleanup_threshold: f64,

    // === Scoring ===
    pub base_points: u64,
    /// Bonus points per unit of speed on a correct answer
    pub speed_bonus_factor: f64,
    /// Points lost on a wrong answer
    pub penalty: u64,
    pub starting_lives: u8,
    pub starting_lane: u8,

    // === Timing ===
    /// How long the correct/wrong outcome stays visible
    pub feedback_duration_ms: f64,
    /// Breather after the outcome clears, before the next gate may spawn
    pub transition_delay_ms: f64,

    // === Obstacles ===
    pub obstacle_spawn_chance: f64,
    /// Minimum distance the previous gate must lead a co-spawned obstacle
    pub obstacle_min_spacing: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 0.2,
            speed_increment: 0.01,
            spawn_distance: 40.0,
            spawn_pos_gate: -20.0,
            collision_threshold: 90.0,
            cleanup_threshold: 150.0,

            base_points: 100,
            speed_bonus_factor: 100.0,
            penalty: 50,
            starting_lives: 3,
            starting_lane: 1,

            feedback_duration_ms: 1000.0,
            transition_delay_ms: 500.0,

            obstacle_spawn_chance: 0.35,
            obstacle_min_spacing: 30.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check that the balance can drive a playable run
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.base_speed > 0.0) {
            return Err(TuningError::NonPositiveSpeed(self.base_speed));
        }
        // Speed only ever grows from the base, so it stays positive
        if !(self.speed_increment >= 0.0) {
            return Err(TuningError::NegativeIncrement(self.speed_increment));
        }
        for (name, value) in [
            ("feedback_duration_ms", self.feedback_duration_ms),
            ("transition_delay_ms", self.transition_delay_ms),
        ] {
            if !(value >= 0.0) {
                return Err(TuningError::NegativeDuration { name, value });
            }
        }
        if !(self.spawn_pos_gate < self.collision_threshold
            && self.collision_threshold < self.cleanup_threshold)
        {
            return Err(TuningError::TrackOrder {
                spawn: self.spawn_pos_gate,
                collision: self.collision_threshold,
                cleanup: self.cleanup_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.obstacle_spawn_chance) {
            return Err(TuningError::Probability(self.obstacle_spawn_chance));
        }
        if self.starting_lives == 0 {
            return Err(TuningError::NoLives);
        }
        if !crate::is_valid_lane(self.starting_lane) {
            return Err(TuningError::StartingLane(self.starting_lane));
        }
        Ok(())
    }

    /// Tuning with obstacles switched off (handy for focused tests and demos)
    pub fn without_obstacles() -> Self {
        Self {
            obstacle_spawn_chance: 0.0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"base_speed": 0.5, "penalty": 10}"#).unwrap();
        assert_eq!(tuning.base_speed, 0.5);
        assert_eq!(tuning.penalty, 10);
        assert_eq!(tuning.collision_threshold, 90.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Tuning::from_json(r#"{"base_speed": 0}"#),
            Err(TuningError::NonPositiveSpeed(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{"collision_threshold": 200}"#),
            Err(TuningError::TrackOrder { .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{"obstacle_spawn_chance": 1.5}"#),
            Err(TuningError::Probability(_))
        ));
        assert_eq!(
            Tuning::from_json(r#"{"starting_lane": 4}"#),
            Err(TuningError::StartingLane(4))
        );
        assert_eq!(
            Tuning::from_json(r#"{"speed_increment": -0.5}"#),
            Err(TuningError::NegativeIncrement(-0.5))
        );
        assert_eq!(
            Tuning::from_json(r#"{"transition_delay_ms": -1}"#),
            Err(TuningError::NegativeDuration {
                name: "transition_delay_ms",
                value: -1.0
            })
        );
        assert!(matches!(
            Tuning::from_json(r#"{"feedback_duration_ms": -250}"#),
            Err(TuningError::NegativeDuration {
                name: "feedback_duration_ms",
                ..
            })
        ));
        assert!(Tuning::from_json(r#"{"speed_increment": 0, "transition_delay_ms": 0}"#).is_ok());
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Json(_))
        ));
    }
}
