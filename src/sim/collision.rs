//! Motion and collision against the player's lane
//!
//! Gates and obstacles move along a single track axis. An entity "collides"
//! the first tick its position reaches the collision threshold; the
//! `resolved` flag makes that evaluation happen exactly once per entity.

use super::state::{Gate, Obstacle, Outcome};

/// A gate that reached the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateResolution {
    pub gate_id: u32,
    pub outcome: Outcome,
}

/// Everything that reached the player during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// At most one gate resolves per tick
    pub gate: Option<GateResolution>,
    /// Obstacles the player drove into (ids)
    pub obstacle_hits: Vec<u32>,
}

impl CollisionReport {
    /// Outcome to show the player, if anything happened
    pub fn visible_outcome(&self) -> Option<Outcome> {
        let obstacle = (!self.obstacle_hits.is_empty()).then_some(Outcome::Wrong);
        match (self.gate.map(|g| g.outcome), obstacle) {
            (Some(a), Some(b)) => Some(a.combine(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Move every live entity toward the player by `speed`
pub fn advance(gates: &mut [Gate], obstacles: &mut [Obstacle], speed: f64) {
    for gate in gates.iter_mut() {
        gate.track_position += speed;
    }
    for obstacle in obstacles.iter_mut() {
        obstacle.track_position += speed;
    }
}

/// Resolve entities that reached `threshold` against `selected_lane`.
///
/// Only the first qualifying gate resolves; any other gate past the threshold
/// stays unresolved and is picked up on a following tick. Obstacles are
/// independent of the gate result.
pub fn evaluate(
    gates: &mut [Gate],
    obstacles: &mut [Obstacle],
    selected_lane: Option<u8>,
    threshold: f64,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    if let Some(gate) = gates
        .iter_mut()
        .find(|g| !g.resolved && g.track_position >= threshold)
    {
        gate.resolved = true;
        let outcome = if selected_lane == Some(gate.correct_lane) {
            Outcome::Correct
        } else {
            Outcome::Wrong
        };
        log::debug!(
            "Gate {} resolved: {:?} (lane {:?}, answer {})",
            gate.id,
            outcome,
            selected_lane,
            gate.correct_lane
        );
        report.gate = Some(GateResolution {
            gate_id: gate.id,
            outcome,
        });
    }

    for obstacle in obstacles
        .iter_mut()
        .filter(|o| !o.resolved && o.track_position >= threshold)
    {
        obstacle.resolved = true;
        if selected_lane == Some(obstacle.lane) {
            obstacle.hit = true;
            log::debug!("Obstacle {} hit in lane {}", obstacle.id, obstacle.lane);
            report.obstacle_hits.push(obstacle.id);
        }
    }

    report
}

/// Drop entities that travelled past `threshold`
pub fn cleanup(gates: &mut Vec<Gate>, obstacles: &mut Vec<Obstacle>, threshold: f64) {
    gates.retain(|g| g.track_position <= threshold);
    obstacles.retain(|o| o.track_position <= threshold);
}
