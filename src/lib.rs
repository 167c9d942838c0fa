//! Trek - Gamified Learning Journey Progression
//!
//! Trek tracks a learner's progress through a catalog of levels, units, and
//! cards. It derives unlock state from completion (levels unlock in
//! sequence, stages within a unit unlock in a strict chain), accumulates
//! points and a daily streak, and persists the whole state as one JSON
//! document after every committed mutation.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod session;
pub mod storage;

pub use catalog::{Catalog, Card, Exercise, Level, Reward, Section, SectionKind, Unit};
pub use config::Config;
pub use engine::{CARD_POINTS, EXERCISE_POINTS};
pub use error::{Result, TrekError};
pub use progress::{ProgressState, ProgressStore, Streak, UnitProgress};
pub use session::{
    CardPlayback, ReadGate, RecordingSim, RecordingState, Screen, SessionController, Stage,
    StageStatus, UnitFlow,
};
pub use storage::{FileProgressBackend, MemoryProgressBackend, ProgressBackend};

// CLI commands
pub use cli::{
    AdminCommand, CardCommand, ClaimCommand, ExerciseCommand, LevelsCommand, StatusCommand,
    UnitCommand,
};
