//! In-memory session state for trek.
//!
//! Nothing in this module is persisted. `controller` holds screen
//! navigation; `stage` holds the per-unit finite unlock chain and the
//! ephemeral card playback state, including the timed read gate and the
//! evaluation recording simulation.

pub mod controller;
pub mod stage;

pub use controller::{Screen, SessionController};
pub use stage::{
    CardPlayback, ReadGate, RecordingSim, RecordingState, Stage, StageStatus, UnitFlow,
};
