//! Claim command for trek.
//!
//! Claims a unit's reward. Gated behind exercise completion; the badge and
//! message come from the catalog and the reward's points are awarded once.
//! Viewing an already-claimed reward is a successful replay.

use serde::Serialize;

use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Options for the claim command.
#[derive(Debug, Clone, Default)]
pub struct ClaimOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the claim command.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutput {
    /// Whether the reward is claimed (first claim or replay).
    pub success: bool,
    pub unit_id: u32,
    /// Badge identifier from the catalog.
    pub badge: String,
    /// Reward message from the catalog.
    pub message: String,
    /// Points awarded by this call (0 on replay).
    pub points_awarded: u64,
    /// Total points after the call.
    pub total_points: u64,
    /// Whether the reward had already been claimed before this call.
    pub already_claimed: bool,
    /// Error message if the claim was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClaimOutput {
    /// Create a failed output.
    pub fn failure(unit_id: u32, total: u64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            unit_id,
            badge: String::new(),
            message: String::new(),
            points_awarded: 0,
            total_points: total,
            already_claimed: false,
            error: Some(error.into()),
        }
    }
}

/// The claim command implementation.
pub struct ClaimCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> ClaimCommand<B> {
    /// Create a new claim command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the claim command.
    pub fn run(&mut self, unit_id: u32, _options: &ClaimOptions) -> ClaimOutput {
        let Some(unit) = self.store.catalog().unit(unit_id) else {
            return ClaimOutput::failure(
                unit_id,
                self.store.points(),
                format!("Unknown unit: {}", unit_id),
            );
        };

        if !self.store.unit_progress(unit_id).exercise_completed {
            return ClaimOutput::failure(
                unit_id,
                self.store.points(),
                format!("Exercise for unit {} not completed yet", unit_id),
            );
        }

        let badge = unit.reward.badge.clone();
        let message = unit.reward.message.clone();
        let reward_points = unit.reward.points;

        let changed = self.store.claim_reward(unit_id);

        ClaimOutput {
            success: true,
            unit_id,
            badge,
            message,
            points_awarded: if changed { reward_points } else { 0 },
            total_points: self.store.points(),
            already_claimed: !changed,
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ClaimOutput, options: &ClaimOptions) -> String {
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
    fn format_human_readable(&self, output: &ClaimOutput) -> String {
        if !output.success {
            return format!(
                "Claim failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.already_claimed {
            format!(
                "Badge '{}' already earned. {}\n",
                output.badge, output.message
            )
        } else {
            format!(
                "Badge '{}' earned (+{} points)! {}\nTotal points: {}\n",
                output.badge, output.points_awarded, output.message, output.total_points
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::storage::MemoryProgressBackend;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn setup() -> ClaimCommand<Arc<MemoryProgressBackend>> {
        let backend = Arc::new(MemoryProgressBackend::new());
        ClaimCommand::new(ProgressStore::open(
            Arc::new(sample_catalog()),
            backend,
            today(),
        ))
    }

    #[test]
    fn test_claim_gated_behind_exercise() {
        let mut cmd = setup();
        let output = cmd.run(2, &ClaimOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("not completed"));
        assert_eq!(output.total_points, 0);
    }

    #[test]
    fn test_claim_awards_reward_points() {
        let mut cmd = setup();
        cmd.store.complete_exercise(2, today());

        let output = cmd.run(2, &ClaimOptions::default());

        assert!(output.success);
        assert_eq!(output.points_awarded, 15);
        assert_eq!(output.total_points, 25);
        assert!(!output.already_claimed);
        assert!(!output.badge.is_empty());
    }

    #[test]
    fn test_claim_replay_awards_nothing() {
        let mut cmd = setup();
        cmd.store.complete_exercise(2, today());
        cmd.run(2, &ClaimOptions::default());

        let output = cmd.run(2, &ClaimOptions::default());

        assert!(output.success);
        assert!(output.already_claimed);
        assert_eq!(output.points_awarded, 0);
        assert_eq!(output.total_points, 25);
    }

    #[test]
    fn test_claim_unknown_unit_fails() {
        let mut cmd = setup();
        let output = cmd.run(99, &ClaimOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("Unknown unit"));
    }

    #[test]
    fn test_format_output_human_readable() {
        let mut cmd = setup();
        cmd.store.complete_exercise(2, today());
        let output = cmd.run(2, &ClaimOptions::default());
        let formatted = cmd.format_output(&output, &ClaimOptions::default());

        assert!(formatted.contains("earned (+15 points)"));
    }

    #[test]
    fn test_format_output_json() {
        let mut cmd = setup();
        cmd.store.complete_exercise(2, today());
        let output = cmd.run(2, &ClaimOptions::default());

        let options = ClaimOptions {
            json: true,
            ..Default::default()
        };
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"points_awarded\": 15"));
    }
}
