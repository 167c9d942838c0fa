//! Mutable, persisted progress for trek.
//!
//! `state` holds the persisted document types and their tolerant wire
//! decoding; `store` is the process-wide progress store that owns the
//! in-memory state and writes it back after every mutation.

pub mod state;
pub mod store;

pub use state::{ProgressState, Streak, UnitProgress};
pub use store::ProgressStore;
