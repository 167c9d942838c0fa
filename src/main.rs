//! Trek - Gamified Learning Journey Progression
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use trek::catalog::Catalog;
use trek::config::{crash_log_path, Config};
use trek::progress::ProgressStore;
use trek::storage::FileProgressBackend;

// =============================================================================
// CLI Definition
// =============================================================================

/// Trek - Gamified Learning Journey Progression
#[derive(Parser)]
#[command(name = "trek")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show points, streak, and overall completion
    Status {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List levels with unlock state and per-level completion
    Levels {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show a unit's stage chain and where it resumes
    Unit {
        /// Unit id
        unit_id: u32,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Record a card completion
    Card {
        /// Unit id
        unit_id: u32,
        /// Card id within the unit
        card_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Record an exercise completion (requires all cards)
    Exercise {
        /// Unit id
        unit_id: u32,
        /// Completion date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Claim a unit's reward (requires the exercise)
    Claim {
        /// Unit id
        unit_id: u32,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Set or clear the persisted admin unlock flag
    Admin {
        /// "on" or "off"
        state: AdminState,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum AdminState {
    On,
    Off,
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("trek error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.trek/crash.log and exits non-zero without
/// unwinding through the terminal state.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("trek panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(2);
    }));
}

/// Build the progress store from config: catalog, file backend, today's
/// date, and the process-scoped unlock override.
fn open_store(config: &Config) -> Result<ProgressStore<FileProgressBackend>, Box<dyn std::error::Error>> {
    let catalog_path = config
        .catalog_path()
        .ok_or("could not resolve catalog path (no home directory)")?;
    let catalog = std::sync::Arc::new(Catalog::load(&catalog_path)?);

    let backend = FileProgressBackend::new()?;
    let today = chrono::Local::now().date_naive();

    let mut store = ProgressStore::open(catalog, backend, today);
    store.set_unlock_override(config.admin.unlock_override);
    Ok(store)
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load_fail_open();

    match cli.command {
        Commands::Status { json, quiet } => run_status(&config, json, quiet),
        Commands::Levels { json, quiet } => run_levels(&config, json, quiet),
        Commands::Unit {
            unit_id,
            json,
            quiet,
        } => run_unit(&config, unit_id, json, quiet),
        Commands::Card {
            unit_id,
            card_id,
            json,
            quiet,
        } => run_card(&config, unit_id, &card_id, json, quiet),
        Commands::Exercise {
            unit_id,
            date,
            json,
            quiet,
        } => run_exercise(&config, unit_id, date, json, quiet),
        Commands::Claim {
            unit_id,
            json,
            quiet,
        } => run_claim(&config, unit_id, json, quiet),
        Commands::Admin { state, json, quiet } => run_admin(&config, state, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_status(
    config: &Config,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::status::{StatusCommand, StatusOptions};

    let cmd = StatusCommand::new(open_store(config)?);
    let options = StatusOptions { json, quiet };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_levels(
    config: &Config,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::levels::{LevelsCommand, LevelsOptions};

    let cmd = LevelsCommand::new(open_store(config)?);
    let options = LevelsOptions { json, quiet };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_unit(
    config: &Config,
    unit_id: u32,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::unit_cmd::{UnitCommand, UnitOptions};

    let cmd = UnitCommand::new(open_store(config)?);
    let options = UnitOptions { json, quiet };

    let output = cmd.run(unit_id, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_card(
    config: &Config,
    unit_id: u32,
    card_id: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::card::{CardCommand, CardOptions};

    let mut cmd = CardCommand::new(open_store(config)?);
    let options = CardOptions { json, quiet };

    let output = cmd.run(unit_id, card_id, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_exercise(
    config: &Config,
    unit_id: u32,
    date: Option<NaiveDate>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::exercise::{ExerciseCommand, ExerciseOptions};

    let mut cmd = ExerciseCommand::new(open_store(config)?);
    let options = ExerciseOptions { json, quiet };
    let today = date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let output = cmd.run(unit_id, today, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_claim(
    config: &Config,
    unit_id: u32,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::claim::{ClaimCommand, ClaimOptions};

    let mut cmd = ClaimCommand::new(open_store(config)?);
    let options = ClaimOptions { json, quiet };

    let output = cmd.run(unit_id, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_admin(
    config: &Config,
    state: AdminState,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trek::cli::admin::{AdminCommand, AdminOptions};

    let mut cmd = AdminCommand::new(open_store(config)?);
    let options = AdminOptions { json, quiet };
    let enabled = matches!(state, AdminState::On);

    let output = cmd.run(enabled, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_status() {
        let cli = Cli::try_parse_from(["trek", "status", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Status { json: true, quiet: false }
        ));
    }

    #[test]
    fn test_cli_parses_card() {
        let cli = Cli::try_parse_from(["trek", "card", "3", "intro"]).unwrap();
        match cli.command {
            Commands::Card {
                unit_id, card_id, ..
            } => {
                assert_eq!(unit_id, 3);
                assert_eq!(card_id, "intro");
            }
            _ => panic!("expected card command"),
        }
    }

    #[test]
    fn test_cli_parses_exercise_with_date() {
        let cli = Cli::try_parse_from(["trek", "exercise", "3", "--date", "2026-08-24"]).unwrap();
        match cli.command {
            Commands::Exercise { unit_id, date, .. } => {
                assert_eq!(unit_id, 3);
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 24));
            }
            _ => panic!("expected exercise command"),
        }
    }

    #[test]
    fn test_cli_parses_admin() {
        let cli = Cli::try_parse_from(["trek", "admin", "on"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin {
                state: AdminState::On,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_rejects_bad_unit_id() {
        assert!(Cli::try_parse_from(["trek", "unit", "not-a-number"]).is_err());
    }
}
