//! Card command for trek.
//!
//! Records a card completion. The card must exist in the unit's catalog
//! card list; points are awarded only on the first completion.

use serde::Serialize;

use crate::engine::CARD_POINTS;
use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Options for the card command.
#[derive(Debug, Clone, Default)]
pub struct CardOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the card command.
#[derive(Debug, Clone, Serialize)]
pub struct CardOutput {
    /// Whether the completion was recorded.
    pub success: bool,
    pub unit_id: u32,
    pub card_id: String,
    /// Points awarded by this call (0 on repeat completion).
    pub points_awarded: u64,
    /// Total points after the call.
    pub total_points: u64,
    /// Whether the card had already been completed before this call.
    pub already_completed: bool,
    /// Error message if the completion was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CardOutput {
    /// Create a failed output.
    pub fn failure(unit_id: u32, card_id: &str, total: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            unit_id,
            card_id: card_id.to_string(),
            points_awarded: 0,
            total_points: total,
            already_completed: false,
            error: Some(error.into()),
        }
    }
}

/// The card command implementation.
pub struct CardCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> CardCommand<B> {
    /// Create a new card command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the card command.
    pub fn run(&mut self, unit_id: u32, card_id: &str, _options: &CardOptions) -> CardOutput {
        let known = self
            .store
            .catalog()
            .unit(unit_id)
            .map(|unit| unit.has_card(card_id))
            .unwrap_or(false);
        if !known {
            return CardOutput::failure(
                unit_id,
                card_id,
                self.store.points(),
                format!("Unknown card '{}' in unit {}", card_id, unit_id),
            );
        }

        let changed = self.store.complete_card(unit_id, card_id);

        CardOutput {
            success: true,
            unit_id,
            card_id: card_id.to_string(),
            points_awarded: if changed { CARD_POINTS } else { 0 },
            total_points: self.store.points(),
            already_completed: !changed,
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CardOutput, options: &CardOptions) -> String {
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
    fn format_human_readable(&self, output: &CardOutput) -> String {
        if !output.success {
            return format!(
                "Card failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.already_completed {
            format!(
                "Card '{}' was already completed. Total points: {}\n",
                output.card_id, output.total_points
            )
        } else {
            format!(
                "Card '{}' completed (+{} points). Total points: {}\n",
                output.card_id, output.points_awarded, output.total_points
            )
        }
    }
}
