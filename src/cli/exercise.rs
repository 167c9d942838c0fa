//! Exercise command for trek.
//!
//! Records a unit's exercise completion for a given day. Strictly gated:
//! every card in the unit must be completed first. On the first completion
//! the streak advances and points are awarded.
//!
//! For the evaluation unit the simulated recording runs to completion
//! before the exercise is recorded; it has no effect on persisted state.

use std::thread;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::engine::EXERCISE_POINTS;
use crate::progress::ProgressStore;
use crate::session::{RecordingSim, RecordingState};
use crate::storage::ProgressBackend;

/// Options for the exercise command.
#[derive(Debug, Clone, Default)]
pub struct ExerciseOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the exercise command.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseOutput {
    /// Whether the completion was recorded.
    pub success: bool,
    pub unit_id: u32,
    /// Points awarded by this call (0 on repeat completion).
    pub points_awarded: u64,
    /// Total points after the call.
    pub total_points: u64,
    /// Streak count after the call.
    pub streak: u32,
    /// Whether the exercise had already been completed.
    pub already_completed: bool,
    /// Whether the evaluation recording ran.
    pub recording: bool,
    /// Error message if the completion was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExerciseOutput {
    /// Create a failed output.
    pub fn failure(unit_id: u32, total: u64, streak: u32, error: impl Into<String>) -> Self {
        Self {
            success: false,
            unit_id,
            points_awarded: 0,
            total_points: total,
            streak,
            already_completed: false,
            recording: false,
            error: Some(error.into()),
        }
    }
}

/// The exercise command implementation.
pub struct ExerciseCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> ExerciseCommand<B> {
    /// Create a new exercise command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the exercise command for `today`.
    pub fn run(&mut self, unit_id: u32, today: NaiveDate, _options: &ExerciseOptions) -> ExerciseOutput {
        let Some(unit) = self.store.catalog().unit(unit_id) else {
            return ExerciseOutput::failure(
                unit_id,
                self.store.points(),
                self.store.streak().count,
                format!("Unknown unit: {}", unit_id),
            );
        };

        let progress = self.store.unit_progress(unit_id);
        let already = progress.exercise_completed;

        if !already {
            let cards_done = unit
                .card_ids()
                .all(|card_id| progress.completed_cards.contains(card_id));
            if !cards_done {
                return ExerciseOutput::failure(
                    unit_id,
                    self.store.points(),
                    self.store.streak().count,
                    format!("Unit {} still has incomplete cards", unit_id),
                );
            }
        }

        let recording = !already && self.store.catalog().is_evaluation_unit(unit_id);
        if recording {
            Self::run_recording();
        }

        let changed = self.store.complete_exercise(unit_id, today);

        ExerciseOutput {
            success: true,
            unit_id,
            points_awarded: if changed { EXERCISE_POINTS } else { 0 },
            total_points: self.store.points(),
            streak: self.store.streak().count,
            already_completed: !changed,
            recording,
            error: None,
        }
    }

    /// Drive the recording simulation against the real clock until it
    /// reaches Saved.
    fn run_recording() {
        let mut sim = RecordingSim::new();
        sim.start(Utc::now());
        while sim.poll(Utc::now()) != RecordingState::Saved {
            thread::sleep(Duration::from_millis(100));
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ExerciseOutput, options: &ExerciseOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &ExerciseOutput) -> String {
        if !output.success {
            return format!(
                "Exercise failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut text = String::new();
        if output.recording {
            text.push_str("Recording saved.\n");
        }
        if output.already_completed {
            text.push_str(&format!(
                "Exercise for unit {} was already completed. Total points: {}\n",
                output.unit_id, output.total_points
            ));
        } else {
            text.push_str(&format!(
                "Exercise completed (+{} points). Total points: {}. Streak: {} day(s)\n",
                output.points_awarded, output.total_points, output.streak
            ));
        }
        text
    }
}
