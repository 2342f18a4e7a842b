//! Quiz Rush - A lane-racing quiz game
//!
//! Core modules:
//! - `sim`: Fixed-step game loop (gates, obstacles, scoring, feedback timing)
//! - `questions`: Question pool loading and validation
//! - `tuning`: Data-driven game balance
//! - `web`: Browser host driving the simulation (wasm32 only)
//! - `server`: Question-generation HTTP service (native only)

pub mod questions;
pub mod sim;
pub mod tuning;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use questions::{PoolError, Question};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Number of lanes on the track (one per answer option)
    pub const LANE_COUNT: u8 = 4;
    /// Options carried by every question
    pub const OPTION_COUNT: usize = LANE_COUNT as usize;

    /// Fixed simulation step in milliseconds (~60 Hz)
    pub const SIM_DT_MS: f64 = 16.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame gap fed into the accumulator (tab switches etc.)
    pub const MAX_FRAME_MS: f64 = 100.0;
}

/// True when `lane` names one of the track's lanes
#[inline]
pub fn is_valid_lane(lane: u8) -> bool {
    lane < consts::LANE_COUNT
}

/// Lane index from a host-supplied number; fractions and out-of-range values yield `None`
pub fn lane_from_host(lane: f64) -> Option<u8> {
    let in_range = lane >= 0.0 && lane < f64::from(consts::LANE_COUNT);
    (in_range && lane.fract() == 0.0).then_some(lane as u8)
}
