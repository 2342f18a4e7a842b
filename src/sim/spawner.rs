//! Gate and obstacle spawning

use rand::Rng;
use rand::seq::IndexedRandom;

use super::rotation::pick_next;
use super::state::{GameState, Gate, Obstacle, ObstacleKind};
use crate::consts::LANE_COUNT;

/// Spawn the next gate (and maybe an obstacle) if the track is ready for it.
///
/// Returns the new gate's id. Nothing spawns while a feedback/transition hold
/// is running, while another gate is still unanswered, before the previous
/// gate has cleared `spawn_distance`, or when the pool is empty.
pub fn spawn(state: &mut GameState) -> Option<u32> {
    if !state.is_playing() || !state.sequencer.is_idle() {
        return None;
    }
    if state.unresolved_gates().next().is_some() {
        return None;
    }
    let prior_position = state.gates.last().map(|g| g.track_position);
    if prior_position.is_some_and(|pos| pos <= state.tuning.spawn_distance) {
        return None;
    }

    let (question, used) = pick_next(
        &state.question_pool,
        &state.used_question_ids,
        &mut state.rng,
    )?;
    let question = question.clone();
    state.used_question_ids = used;

    let spawn_pos = state.tuning.spawn_pos_gate;
    let gate_id = state.next_entity_id();
    let gate = Gate::from_question(gate_id, &question, spawn_pos);
    let correct_lane = gate.correct_lane;
    state.current_question_text = question.text;
    state.gates.push(gate);
    log::debug!(
        "Spawned gate {} for question {} (answer lane {})",
        gate_id,
        question.id,
        correct_lane
    );

    let spaced = prior_position
        .is_none_or(|pos| pos - spawn_pos >= state.tuning.obstacle_min_spacing);
    let roll = state.rng.random_bool(state.tuning.obstacle_spawn_chance);
    if roll && spaced {
        let lane = obstacle_lane(&mut state.rng, correct_lane);
        let kind = *ObstacleKind::ALL
            .choose(&mut state.rng)
            .unwrap_or(&ObstacleKind::Barrier);
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            lane,
            track_position: spawn_pos,
            kind,
            hit: false,
            resolved: false,
        });
        log::debug!("Spawned {:?} obstacle {} in lane {}", kind, id, lane);
    }

    Some(gate_id)
}

/// Uniform pick among the lanes that are not `correct_lane`
fn obstacle_lane<R: Rng + ?Sized>(rng: &mut R, correct_lane: u8) -> u8 {
    let lane = rng.random_range(0..LANE_COUNT - 1);
    if lane >= correct_lane { lane + 1 } else { lane }
}
