//! Levels command for trek.
//!
//! Lists every level with its unlock state and per-level completion, the
//! same derivation the home screen renders from.

use serde::Serialize;

use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Options for the levels command.
#[derive(Debug, Clone, Default)]
pub struct LevelsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One level row in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct LevelRow {
    pub level_id: u32,
    pub title: String,
    pub unlocked: bool,
    pub completed_units: usize,
    pub total_units: usize,
}

/// Output format for the levels command.
#[derive(Debug, Clone, Serialize)]
pub struct LevelsOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// Levels in catalog order.
    pub levels: Vec<LevelRow>,
}

/// The levels command implementation.
pub struct LevelsCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> LevelsCommand<B> {
    /// Create a new levels command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the levels command.
    pub fn run(&self, _options: &LevelsOptions) -> LevelsOutput {
        let unlocked = self.store.unlocked_levels();

        let levels = self
            .store
            .catalog()
            .levels
            .iter()
            .zip(unlocked)
            .map(|(level, (_, unlocked))| LevelRow {
                level_id: level.level_id,
                title: level.title.clone(),
                unlocked,
                completed_units: self.store.completed_units_count(level.level_id),
                total_units: level.units.len(),
            })
            .collect();

        LevelsOutput {
            success: true,
            levels,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LevelsOutput, options: &LevelsOptions) -> String {
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
    fn format_human_readable(&self, output: &LevelsOutput) -> String {
        let mut text = String::new();
        for row in &output.levels {
            let marker = if row.unlocked { " " } else { "x" };
            text.push_str(&format!(
                "[{}] Level {}: {} ({}/{} units)\n",
                marker, row.level_id, row.title, row.completed_units, row.total_units
            ));
        }
        text
    }
}
