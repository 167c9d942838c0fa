//! Per-unit stage sequencing.
//!
//! A unit's stages form one strict linear unlock chain: each card in catalog
//! order, then the exercise, then the reward. Stage i+1 is reachable only
//! once stage i is completed. Activating a locked stage is a no-op, so
//! racing activations can never produce an inconsistent view. Re-entering a
//! completed stage replays it read-only via the `already_completed` flag.
//!
//! Card playback (section order within a card) and the timed gates are
//! ephemeral: they are never persisted and are discarded when the card
//! completes or the view is dismissed.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::Unit;
use crate::progress::state::UnitProgress;

/// Seconds a section must stay open before its complete action enables.
pub const READ_GATE_SECONDS: i64 = 30;

/// Seconds the simulated evaluation recording runs.
pub const RECORDING_SECONDS: i64 = 3;

/// One step in a unit's unlock chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Card at this index in catalog order.
    Card(usize),
    Exercise,
    Reward,
}

/// Derived status of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageStatus {
    Locked,
    Unlocked,
    Completed,
}

/// A granted stage activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub stage: Stage,
    /// Replay mode: render content but never re-mutate flags or points.
    pub already_completed: bool,
}

/// The unlock chain for one unit, derived from catalog order and progress.
///
/// Derivation only; completing a stage goes through the progress store, and
/// the flow is rebuilt from the updated snapshot.
#[derive(Debug, Clone)]
pub struct UnitFlow {
    card_count: usize,
    /// Cards completed in chain order; a stale completed id not in the
    /// catalog does not advance the chain.
    cards_completed: Vec<bool>,
    exercise_completed: bool,
    reward_claimed: bool,
}

impl UnitFlow {
    /// Build the flow for a unit from a progress snapshot.
    pub fn new(unit: &Unit, progress: &UnitProgress) -> Self {
        let cards_completed = unit
            .cards
            .iter()
            .map(|card| progress.completed_cards.contains(&card.card_id))
            .collect();

        Self {
            card_count: unit.cards.len(),
            cards_completed,
            exercise_completed: progress.exercise_completed,
            reward_claimed: progress.reward_claimed,
        }
    }

    /// All stages in chain order.
    pub fn stages(&self) -> Vec<Stage> {
        (0..self.card_count)
            .map(Stage::Card)
            .chain([Stage::Exercise, Stage::Reward])
            .collect()
    }

    fn all_cards_completed(&self) -> bool {
        self.cards_completed.iter().all(|&done| done)
    }

    /// Status of a single stage. A card index past the catalog is Locked.
    pub fn status(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Card(index) => {
                if index >= self.card_count {
                    StageStatus::Locked
                } else if self.cards_completed[index] {
                    StageStatus::Completed
                } else if self.cards_completed[..index].iter().all(|&done| done) {
                    StageStatus::Unlocked
                } else {
                    StageStatus::Locked
                }
            }
            Stage::Exercise => {
                if self.exercise_completed {
                    StageStatus::Completed
                } else if self.all_cards_completed() {
                    StageStatus::Unlocked
                } else {
                    StageStatus::Locked
                }
            }
            Stage::Reward => {
                if self.reward_claimed {
                    StageStatus::Completed
                } else if self.exercise_completed {
                    StageStatus::Unlocked
                } else {
                    StageStatus::Locked
                }
            }
        }
    }

    /// Where to resume: the first non-completed stage, or Reward when the
    /// whole unit is done (replay).
    pub fn initial_stage(&self) -> Stage {
        self.stages()
            .into_iter()
            .find(|&stage| self.status(stage) != StageStatus::Completed)
            .unwrap_or(Stage::Reward)
    }

    /// Try to activate a stage. Locked stages are rejected as a plain no-op.
    pub fn activate(&self, stage: Stage) -> Option<Activation> {
        match self.status(stage) {
            StageStatus::Locked => None,
            StageStatus::Unlocked => Some(Activation {
                stage,
                already_completed: false,
            }),
            StageStatus::Completed => Some(Activation {
                stage,
                already_completed: true,
            }),
        }
    }
}

/// Ephemeral section-playback cursor for one card.
///
/// Sections open strictly in order; the card is complete once every section
/// has been opened. Discarded after completion, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardPlayback {
    section_count: usize,
    opened: usize,
}

impl CardPlayback {
    pub fn new(section_count: usize) -> Self {
        Self {
            section_count,
            opened: 0,
        }
    }

    /// Whether the section at `index` can be opened next.
    pub fn can_open(&self, index: usize) -> bool {
        index == self.opened && index < self.section_count
    }

    /// Open the section at `index`. Out-of-order opens are no-ops.
    pub fn open(&mut self, index: usize) -> bool {
        if !self.can_open(index) {
            return false;
        }
        self.opened += 1;
        true
    }

    /// Index of the next section to open, if any remain.
    pub fn next_section(&self) -> Option<usize> {
        (self.opened < self.section_count).then_some(self.opened)
    }

    pub fn is_complete(&self) -> bool {
        self.opened >= self.section_count
    }
}

/// Countdown gate on a section's complete action.
///
/// Pure over an injected `now`; abandoning the view before the delay simply
/// drops the gate with no state effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadGate {
    opened_at: DateTime<Utc>,
}

impl ReadGate {
    pub fn start(now: DateTime<Utc>) -> Self {
        Self { opened_at: now }
    }

    /// Seconds left before the complete action enables (0 when elapsed).
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let elapsed = now.signed_duration_since(self.opened_at).num_seconds();
        (READ_GATE_SECONDS - elapsed).max(0)
    }

    pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
        self.remaining_seconds(now) == 0
    }
}

/// Simulated recording for the evaluation unit's exercise.
///
/// Runs for a fixed duration and lands in Saved; has no effect on persisted
/// state at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSim {
    state: RecordingState,
    started_at: Option<DateTime<Utc>>,
}

impl RecordingSim {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            started_at: None,
        }
    }

    /// Begin recording. No-op while already recording or saved.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != RecordingState::Idle {
            return false;
        }
        self.state = RecordingState::Recording;
        self.started_at = Some(now);
        true
    }

    /// Advance the simulation against the clock and return the state.
    pub fn poll(&mut self, now: DateTime<Utc>) -> RecordingState {
        if self.state == RecordingState::Recording {
            if let Some(started) = self.started_at {
                if now.signed_duration_since(started) >= Duration::seconds(RECORDING_SECONDS) {
                    self.state = RecordingState::Saved;
                }
            }
        }
        self.state
    }
}

impl Default for RecordingSim {
    fn default() -> Self {
        Self::new()
    }
}
