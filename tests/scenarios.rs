// Gameplay scenarios driven through the public tick/command surface.
// These run natively and never touch wasm or the network.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use quiz_rush::Question;
use quiz_rush::consts::SIM_DT_MS;
use quiz_rush::sim::{GameState, GameStatus, Obstacle, ObstacleKind, TickInput, tick};
use quiz_rush::tuning::Tuning;

fn question(id: u32, answer: u8) -> Question {
    Question::new(id, &format!("Question {id}?"), ["A", "B", "C", "D"], answer)
}

fn started(seed: u64, tuning: Tuning, pool: Vec<Question>) -> GameState {
    let mut state = GameState::with_tuning(seed, tuning);
    state.load_question_pool(pool);
    state.start();
    state
}

fn step(state: &mut GameState) {
    tick(state, &TickInput::default(), SIM_DT_MS);
}

/// Tick until the first live gate resolves; returns ticks taken
fn run_until_resolved(state: &mut GameState) -> u32 {
    for n in 1..=10_000 {
        step(state);
        if state.gates.first().is_some_and(|g| g.resolved) {
            return n;
        }
    }
    panic!("gate never resolved");
}

#[test]
fn correct_answer_scores() {
    let mut state = started(1, Tuning::without_obstacles(), vec![question(1, 1)]);
    state.select_lane(1);
    step(&mut state);
    assert_eq!(state.gates.len(), 1);
    assert_eq!(state.current_question_text, "Question 1?");

    let speed = state.speed;
    run_until_resolved(&mut state);

    let expected = 100 + (speed * 100.0).floor() as u64;
    assert_eq!(state.score, expected);
    assert_eq!(state.stats.correct, 1);
    assert_eq!(state.stats.total, 1);
    assert_eq!(state.stats.accuracy, 100);
    assert_eq!(state.lives, 3);
    assert!(state.speed > speed);
    assert!(state.gates[0].track_position >= 90.0);
}

#[test]
fn wrong_answer_costs_life() {
    let mut state = started(1, Tuning::without_obstacles(), vec![question(1, 1)]);
    state.select_lane(0);
    run_until_resolved(&mut state);

    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 2);
    assert_eq!(state.stats.correct, 0);
    assert_eq!(state.stats.total, 1);
    assert_eq!(state.stats.accuracy, 0);
    assert_eq!(state.status, GameStatus::Playing);
}

#[test]
fn last_life_ends_game_same_tick() {
    let mut state = started(1, Tuning::without_obstacles(), vec![question(1, 1)]);
    state.lives = 1;
    state.select_lane(3);
    step(&mut state);

    while state.status == GameStatus::Playing {
        let was_resolved = state.gates[0].resolved;
        step(&mut state);
        if state.gates[0].resolved && !was_resolved {
            assert_eq!(state.status, GameStatus::GameOver);
        }
    }
    assert_eq!(state.status, GameStatus::GameOver);
    assert_eq!(state.lives, 0);

    // Frozen from here on
    let ticks = state.time_ticks;
    step(&mut state);
    assert_eq!(state.time_ticks, ticks);
}

#[test]
fn gate_and_obstacle_both_penalise() {
    let mut state = started(1, Tuning::without_obstacles(), vec![question(1, 1)]);
    step(&mut state);
    let position = state.gates[0].track_position;
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        lane: 2,
        track_position: position,
        kind: ObstacleKind::Barrier,
        hit: false,
        resolved: false,
    });
    state.select_lane(2);

    run_until_resolved(&mut state);

    assert_eq!(state.lives, 1, "wrong gate and obstacle hit both cost a life");
    assert_eq!(state.score, 0);
    assert_eq!(state.stats.total, 1);
    assert_eq!(state.stats.correct, 0);
    assert!(state.obstacles[0].hit);
    assert_eq!(
        state.sequencer.last_outcome,
        Some(quiz_rush::sim::Outcome::Wrong)
    );
}

#[test]
fn correct_gate_and_obstacle_hit_both_apply() {
    let mut state = started(1, Tuning::without_obstacles(), vec![question(1, 1)]);
    step(&mut state);
    let position = state.gates[0].track_position;
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        lane: 1,
        track_position: position,
        kind: ObstacleKind::Hazard,
        hit: false,
        resolved: false,
    });
    state.select_lane(1);

    run_until_resolved(&mut state);

    assert_eq!(state.score, 120);
    assert_eq!(state.stats.correct, 1);
    assert_eq!(state.lives, 2);
}

#[test]
fn rotation_covers_pool_before_repeating() {
    let pool = vec![question(1, 0), question(2, 1), question(3, 2)];
    let mut state = started(77, Tuning::without_obstacles(), pool);

    let mut spawned: Vec<u32> = Vec::new();
    let mut seen_gates = HashSet::new();
    while spawned.len() < 4 {
        step(&mut state);
        if let Some(gate) = state.gates.last() {
            if seen_gates.insert(gate.id) {
                spawned.push(gate.question_id);
                let lane = gate.correct_lane;
                state.select_lane(lane);
            }
        }
        assert!(state.time_ticks < 20_000, "spawns stalled");
    }

    let first_three: BTreeSet<u32> = spawned[..3].iter().copied().collect();
    assert_eq!(first_three, BTreeSet::from([1, 2, 3]));
    assert_eq!(state.lives, 3);
}

#[test]
fn empty_pool_is_quiet_not_fatal() {
    let mut state = started(5, Tuning::default(), Vec::new());
    for _ in 0..1000 {
        step(&mut state);
    }
    assert_eq!(state.status, GameStatus::Playing);
    assert!(state.gates.is_empty());
    assert!(state.obstacles.is_empty());
    assert!(state.current_question_text.is_empty());
}

#[test]
fn feedback_then_gap_then_next_gate() {
    let mut state = started(3, Tuning::without_obstacles(), vec![question(1, 0), question(2, 0)]);
    state.select_lane(0);
    run_until_resolved(&mut state);
    let resolved_at = state.clock_ms;
    assert!(state.sequencer.last_outcome.is_some());
    assert!(!state.current_question_text.is_empty());

    // Feedback hold: question still up, no new gate
    while state.clock_ms < resolved_at + 1000.0 - SIM_DT_MS {
        step(&mut state);
        assert_eq!(state.gates.len(), 1);
        assert!(!state.current_question_text.is_empty());
    }
    step(&mut state);
    assert!(state.current_question_text.is_empty());
    assert_eq!(state.sequencer.last_outcome, None);

    // Transition gap: still locked
    while state.clock_ms < resolved_at + 1500.0 - SIM_DT_MS {
        step(&mut state);
        assert_eq!(state.gates.len(), 1, "spawned during transition gap");
    }
    step(&mut state);
    assert_eq!(state.gates.len(), 2);
    assert!(!state.current_question_text.is_empty());
}

#[test]
fn pause_freezes_holds() {
    let mut state = started(3, Tuning::without_obstacles(), vec![question(1, 0)]);
    run_until_resolved(&mut state);
    let clock = state.clock_ms;
    state.toggle_pause();
    for _ in 0..500 {
        step(&mut state);
    }
    assert_eq!(state.clock_ms, clock);
    assert!(state.sequencer.last_outcome.is_some());
    state.toggle_pause();
    step(&mut state);
    assert!(state.clock_ms > clock);
}

#[test]
fn restart_resets_everything_but_pool() {
    let mut state = started(9, Tuning::default(), quiz_rush::questions::builtin());
    state.select_lane(3);
    for _ in 0..2000 {
        step(&mut state);
    }
    state.restart();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 3);
    assert_eq!(state.speed, 0.2);
    assert_eq!(state.selected_lane, Some(1));
    assert!(state.gates.is_empty() && state.obstacles.is_empty());
    assert!(state.used_question_ids.is_empty());
    assert!(state.sequencer.is_idle());
    assert_eq!(state.question_pool.len(), 5);
}

fn lane_inputs() -> impl Strategy<Value = Vec<(u16, u8)>> {
    // (ticks to hold, lane) segments
    prop::collection::vec((1u16..400, 0u8..4), 1..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Each gate scores once; lives/score floors hold; one live question at a time
    #[test]
    fn invariants_hold_under_random_steering(seed in any::<u64>(), segments in lane_inputs()) {
        let mut state = started(seed, Tuning::default(), quiz_rush::questions::builtin());
        let mut resolved_gates = HashSet::new();
        let mut last_resolved_at: Option<f64> = None;
        let mut known_gates = HashSet::new();

        'outer: for (hold, lane) in segments {
            for _ in 0..hold {
                let before = (state.score, state.stats.clone());
                let input = TickInput { lane: Some(lane), pause: false };
                tick(&mut state, &input, SIM_DT_MS);

                // Lives floor and game over agree
                prop_assert!(state.lives <= 3);
                prop_assert_eq!(state.lives == 0, state.status == GameStatus::GameOver);

                // A wrong answer takes at most the penalty, never below zero
                if state.stats.total > before.1.total && state.stats.correct == before.1.correct {
                    prop_assert_eq!(state.score, before.0.saturating_sub(50));
                }

                // One live question; new gates only after both holds
                prop_assert!(state.unresolved_gates().count() <= 1);
                for gate in &state.gates {
                    if gate.resolved && resolved_gates.insert(gate.id) {
                        last_resolved_at = Some(state.clock_ms);
                    }
                    if known_gates.insert(gate.id) {
                        if let Some(at) = last_resolved_at {
                            prop_assert!(state.clock_ms - at >= 1500.0 - 1e-6);
                        }
                    }
                }

                if state.status == GameStatus::GameOver {
                    break 'outer;
                }
            }
        }

        // Every resolved gate counted exactly once
        prop_assert_eq!(state.stats.total as usize, resolved_gates.len());
    }

    /// Pause toggles without ticks touch nothing but the pause state
    #[test]
    fn pause_toggles_are_idempotent(seed in any::<u64>(), warmup in 1usize..800, toggles in 0usize..6) {
        let mut state = started(seed, Tuning::default(), quiz_rush::questions::builtin());
        for _ in 0..warmup {
            tick(&mut state, &TickInput::default(), SIM_DT_MS);
        }
        let status = state.status;
        let gates = state.gates.clone();
        let obstacles = state.obstacles.clone();

        for _ in 0..toggles {
            state.toggle_pause();
        }

        prop_assert_eq!(&state.gates, &gates);
        prop_assert_eq!(&state.obstacles, &obstacles);
        if status == GameStatus::Playing {
            let expected = if toggles % 2 == 0 { GameStatus::Playing } else { GameStatus::Paused };
            prop_assert_eq!(state.status, expected);
        } else {
            prop_assert_eq!(state.status, status);
        }
    }
}
