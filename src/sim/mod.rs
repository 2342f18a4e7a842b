//! Game loop simulation
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform code:
//! - Fixed step only (speed is applied per tick, time is passed in)
//! - Seeded RNG only
//! - Stable iteration order (entities kept in spawn order)
//!
//! Per-tick order: advance -> collide -> score -> sequence -> cleanup -> spawn.

pub mod collision;
pub mod ledger;
pub mod rotation;
pub mod sequencer;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, GateResolution, advance, cleanup, evaluate};
pub use ledger::LedgerEvent;
pub use rotation::pick_next;
pub use sequencer::{Sequencer, SequencerPhase, SequencerStep};
pub use spawner::spawn;
pub use state::{GameState, GameStatus, Gate, Obstacle, ObstacleKind, Outcome, Stats};
pub use tick::{TickInput, tick};
