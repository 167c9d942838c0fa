//! Admin command for trek.
//!
//! Sets or clears the persisted admin unlock flag. The flag unlocks every
//! level regardless of completion; the process-scoped config override is
//! separate and never written here.

use serde::Serialize;

use crate::progress::ProgressStore;
use crate::storage::ProgressBackend;

/// Options for the admin command.
#[derive(Debug, Clone, Default)]
pub struct AdminOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the admin command.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOutput {
    /// Whether the command succeeded.
    pub success: bool,
    /// The persisted admin flag after the call.
    pub admin: bool,
    /// Whether the flag changed.
    pub changed: bool,
}

/// The admin command implementation.
pub struct AdminCommand<B: ProgressBackend> {
    store: ProgressStore<B>,
}

impl<B: ProgressBackend> AdminCommand<B> {
    /// Create a new admin command.
    pub fn new(store: ProgressStore<B>) -> Self {
        Self { store }
    }

    /// Run the admin command, setting the persisted flag to `enabled`.
    pub fn run(&mut self, enabled: bool, _options: &AdminOptions) -> AdminOutput {
        let changed = self.store.set_admin(enabled);

        AdminOutput {
            success: true,
            admin: enabled,
            changed,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &AdminOutput, options: &AdminOptions) -> String {
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
    fn format_human_readable(&self, output: &AdminOutput) -> String {
        let state = if output.admin { "enabled" } else { "disabled" };
        if output.changed {
            format!("Admin unlock {}.\n", state)
        } else {
            format!("Admin unlock already {}.\n", state)
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

    fn setup() -> (AdminCommand<Arc<MemoryProgressBackend>>, Arc<MemoryProgressBackend>) {
        let backend = Arc::new(MemoryProgressBackend::new());
        let store = ProgressStore::open(
            Arc::new(sample_catalog()),
            Arc::clone(&backend),
            today(),
        );
        (AdminCommand::new(store), backend)
    }

    #[test]
    fn test_admin_enable_persists() {
        let (mut cmd, backend) = setup();
        let output = cmd.run(true, &AdminOptions::default());

        assert!(output.success);
        assert!(output.admin);
        assert!(output.changed);

        let doc = backend.load().unwrap().unwrap();
        assert_eq!(doc["isAdmin"], true);
    }

    #[test]
    fn test_admin_enable_twice_unchanged() {
        let (mut cmd, _backend) = setup();
        cmd.run(true, &AdminOptions::default());
        let output = cmd.run(true, &AdminOptions::default());

        assert!(output.success);
        assert!(!output.changed);
    }

    #[test]
    fn test_admin_disable() {
        let (mut cmd, backend) = setup();
        cmd.run(true, &AdminOptions::default());
        let output = cmd.run(false, &AdminOptions::default());

        assert!(output.changed);
        assert!(!output.admin);

        let doc = backend.load().unwrap().unwrap();
        assert_eq!(doc["isAdmin"], false);
    }

    #[test]
    fn test_format_output_human_readable() {
        let (mut cmd, _backend) = setup();
        let output = cmd.run(true, &AdminOptions::default());
        let formatted = cmd.format_output(&output, &AdminOptions::default());

        assert!(formatted.contains("Admin unlock enabled"));
    }

    #[test]
    fn test_format_output_json() {
        let (mut cmd, _backend) = setup();
        let output = cmd.run(true, &AdminOptions::default());

        let options = AdminOptions {
            json: true,
            ..Default::default()
        };
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"admin\": true"));
    }
}
