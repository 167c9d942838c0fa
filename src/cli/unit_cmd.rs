//! Unit command for trek.
//!
//! Shows a unit's stage chain (cards, exercise, reward) with each stage's
//! derived status, plus the stage the unit would resume at.

use serde::Serialize;

use crate::progress::ProgressStore;
use crate::session::{Stage, StageStatus, UnitFlow};
use crate::storage::ProgressBackend;

/// Options for the unit command.
#[derive(Debug, Clone, Default)]
pub struct UnitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One stage row in the chain listing.
#[derive(Debug, Clone, Serialize)]
pub struct StageRow {
    /// Stage label: the card id, "exercise", or "reward".
    pub stage: String,
    /// "locked", "unlocked", or "completed".
    pub status: String,
}

/// Output format for the unit command.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutput {
    /// Whether the command succeeded.
    pub success: bool,
    pub unit_id: u32,
    pub title: String,
    /// Stage chain in order.
    pub stages: Vec<StageRow>,
    /// Label of the stage the unit resumes at.
    pub resume: String,
    /// Whether this is the evaluation unit.
    pub evaluation: bool,
    /// Error message if the command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UnitOutput {
    /// Create a failed output.
    pub fn failure(unit_id: u32, error: impl Into<String>) -> Self {
        Self {
            success: false,
            unit_id,
            title: String::new(),
            stages: Vec::new(),
            resume: String::new(),
            evaluation: false,
            error: Some(error.into()),
        }
    }
}

/// The unit command implementation.
pub struct UnitCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> UnitCommand<B> {
    /// Create a new unit command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the unit command for one unit.
    pub fn run(&self, unit_id: u32, _options: &UnitOptions) -> UnitOutput {
        let Some(unit) = self.store.catalog().unit(unit_id) else {
            return UnitOutput::failure(unit_id, format!("Unknown unit: {}", unit_id));
        };

        let progress = self.store.unit_progress(unit_id);
        let flow = UnitFlow::new(unit, &progress);

        let stages = flow
            .stages()
            .into_iter()
            .map(|stage| StageRow {
                stage: Self::stage_label(unit, stage),
                status: Self::status_label(flow.status(stage)),
            })
            .collect();

        UnitOutput {
            success: true,
            unit_id,
            title: unit.title.clone(),
            stages,
            resume: Self::stage_label(unit, flow.initial_stage()),
            evaluation: self.store.catalog().is_evaluation_unit(unit_id),
            error: None,
        }
    }

    fn stage_label(unit: &crate::catalog::Unit, stage: Stage) -> String {
        match stage {
            Stage::Card(index) => unit
                .cards
                .get(index)
                .map(|card| card.card_id.clone())
                .unwrap_or_else(|| format!("card-{}", index)),
            Stage::Exercise => "exercise".to_string(),
            Stage::Reward => "reward".to_string(),
        }
    }

    fn status_label(status: StageStatus) -> String {
        match status {
            StageStatus::Locked => "locked",
            StageStatus::Unlocked => "unlocked",
            StageStatus::Completed => "completed",
        }
        .to_string()
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &UnitOutput, options: &UnitOptions) -> String {
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
    fn format_human_readable(&self, output: &UnitOutput) -> String {
        if !output.success {
            return format!(
                "Unit failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut text = format!("Unit {}: {}\n", output.unit_id, output.title);
        if output.evaluation {
            text.push_str("(evaluation unit)\n");
        }
        for row in &output.stages {
            text.push_str(&format!("  {:<12} {}\n", row.stage, row.status));
        }
        text.push_str(&format!("Resume at: {}\n", output.resume));
        text
    }
}
