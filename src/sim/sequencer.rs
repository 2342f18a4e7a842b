//! Feedback/transition sequencing
//!
//! After a gate resolves, the outcome stays on screen for a feedback hold,
//! then a short transition gap follows before the spawner may place the next
//! gate. Both holds are deadlines on the simulation clock, so a restart (which
//! replaces the sequencer) or a pause (which stops the clock) never lets a
//! stale hold fire against the wrong session.

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use super::state::Outcome;

/// Where the sequencer is within one question cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SequencerPhase {
    /// No hold active; spawning allowed
    #[default]
    Idle,
    /// Outcome visible until the deadline
    Feedback { until_ms: f64 },
    /// Outcome cleared, spawn still locked until the deadline
    TransitionGap { until_ms: f64 },
}

/// Effects the caller must apply when a hold elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStep {
    /// Feedback hold ended: the question and outcome leave the screen
    FeedbackCleared,
    /// Transition gap ended: the spawner is unlocked
    Unlocked,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequencer {
    pub phase: SequencerPhase,
    /// Outcome currently shown to the player
    pub last_outcome: Option<Outcome>,
}

impl Sequencer {
    pub fn is_idle(&self) -> bool {
        self.phase == SequencerPhase::Idle
    }

    pub fn is_transition_locked(&self) -> bool {
        !self.is_idle()
    }

    /// Start a feedback hold, or fold a concurrent outcome into the running one
    pub fn begin(&mut self, outcome: Outcome, now_ms: f64, feedback_ms: f64) {
        match self.phase {
            SequencerPhase::Idle => {
                self.phase = SequencerPhase::Feedback {
                    until_ms: now_ms + feedback_ms,
                };
                self.last_outcome = Some(outcome);
            }
            SequencerPhase::Feedback { .. } | SequencerPhase::TransitionGap { .. } => {
                self.last_outcome = Some(match self.last_outcome {
                    Some(shown) => shown.combine(outcome),
                    None => outcome,
                });
            }
        }
    }

    /// Move past every hold whose deadline is at or before `now_ms`.
    ///
    /// Each following hold is anchored on the previous deadline, so a long
    /// frame may cross both holds in one call.
    pub fn advance(&mut self, now_ms: f64, transition_ms: f64) -> Vec<SequencerStep> {
        let mut steps = Vec::new();
        loop {
            match self.phase {
                SequencerPhase::Feedback { until_ms } if now_ms >= until_ms => {
                    self.phase = SequencerPhase::TransitionGap {
                        until_ms: until_ms + transition_ms,
                    };
                    self.last_outcome = None;
                    steps.push(SequencerStep::FeedbackCleared);
                }
                SequencerPhase::TransitionGap { until_ms } if now_ms >= until_ms => {
                    self.phase = SequencerPhase::Idle;
                    self.last_outcome = None;
                    steps.push(SequencerStep::Unlocked);
                }
                _ => break,
            }
        }
        steps
    }
}

// Snapshot form also carries the derived lock flag for the presentation layer
impl Serialize for Sequencer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_struct("Sequencer", 3)?;
        out.serialize_field("phase", &self.phase)?;
        out.serialize_field("lastOutcome", &self.last_outcome)?;
        out.serialize_field("isTransitionLocked", &self.is_transition_locked())?;
        out.end()
    }
}
