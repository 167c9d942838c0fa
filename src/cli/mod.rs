//! CLI commands for trek.
//!
//! Commands are organized into:
//! - **Progress commands**: card, exercise, claim (record completions)
//! - **Read commands**: status, levels, unit (inspect derived state)
//! - **Capability commands**: admin (persisted unlock flag)
//!
//! Every command owns a [`ProgressStore`](crate::progress::ProgressStore)
//! and follows the same shape: an options struct, a serializable output
//! struct with success/failure constructors, and `run` plus
//! `format_output`.

// Progress commands
pub mod card;
pub mod claim;
pub mod exercise;

// Read commands
pub mod levels;
pub mod status;
pub mod unit_cmd;

// Capability commands
pub mod admin;

pub use admin::AdminCommand;
pub use card::CardCommand;
pub use claim::ClaimCommand;
pub use exercise::ExerciseCommand;
pub use levels::LevelsCommand;
pub use status::StatusCommand;
pub use unit_cmd::UnitCommand;
