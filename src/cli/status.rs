//! Status command for trek.
//!
//! Reports total points, the current streak, and overall completion.

use serde::Serialize;

use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// Total accumulated points.
    pub points: u64,
    /// Consecutive-day streak count.
    pub streak: u32,
    /// Date of the last streak-advancing completion (ISO format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<String>,
    /// Units fully completed across all levels.
    pub completed_units: usize,
    /// Total units in the catalog.
    pub total_units: usize,
    /// Whether the admin unlock is active (persisted flag or override).
    pub admin: bool,
}

/// The status command implementation.
pub struct StatusCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> StatusCommand<B> {
    /// Create a new status command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the status command.
    pub fn run(&self, _options: &StatusOptions) -> StatusOutput {
        let catalog = self.store.catalog();

        let completed_units = catalog
            .levels
            .iter()
            .map(|level| self.store.completed_units_count(level.level_id))
            .sum();
        let total_units = catalog.levels.iter().map(|l| l.units.len()).sum();

        StatusOutput {
            success: true,
            points: self.store.points(),
            streak: self.store.streak().count,
            last_active: self.store.streak().last_date.map(|d| d.to_string()),
            completed_units,
            total_units,
            admin: self.store.is_admin(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
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
    fn format_human_readable(&self, output: &StatusOutput) -> String {
        let mut text = format!(
            "Points: {}\nStreak: {} day(s)\nUnits completed: {}/{}\n",
            output.points, output.streak, output.completed_units, output.total_units
        );
        if let Some(last) = &output.last_active {
            text.push_str(&format!("Last active: {}\n", last));
        }
        if output.admin {
            text.push_str("Admin unlock: active\n");
        }
        text
    }
}
