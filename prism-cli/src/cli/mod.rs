//! Command-line interface definition

pub mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "prism-cli")]
#[command(version, about = "Nutanix Prism Central VM category management")]
pub struct Cli {
    /// Path to the config file (default: ~/.config/prism-cli/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase diagnostic detail (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull VM and category inventory from Prism Central
    ///
    /// Persists the raw JSON inventory and refreshes the reference sheets
    /// of the workbook (the editable sheet is preserved).
    Fetch {
        /// Directory for the persisted JSON inventory
        #[arg(long, default_value = "files")]
        out: PathBuf,

        /// Page size for list requests
        #[arg(long, default_value_t = 100)]
        limit: usize,

        /// Workbook to refresh (overrides the config file)
        #[arg(short, long)]
        workbook: Option<PathBuf>,
    },

    /// Reconcile the editable sheet against the registry and catalog
    Check {
        /// Workbook to check (overrides the config file)
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Compute and report verdicts without saving the workbook
        #[arg(long)]
        dry_run: bool,

        /// Compare VM and category keys exactly as entered
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Apply reconciled category assignments through the API
    ///
    /// Only rows whose match status reads OK are applied.
    Apply {
        /// Workbook to apply from (overrides the config file)
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Report what would be applied without calling the API or saving
        #[arg(long)]
        dry_run: bool,
    },
}

/// Run outcome for the non-fatal paths. Fatal setup/persistence errors
/// travel as `anyhow::Error` and exit with code 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every non-skipped row succeeded.
    Clean,
    /// The run completed but at least one row failed.
    RowFailures,
}

impl RunStatus {
    pub fn from_all_ok(all_ok: bool) -> Self {
        if all_ok {
            RunStatus::Clean
        } else {
            RunStatus::RowFailures
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::RowFailures => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_status_maps_to_exit_codes() {
        assert_eq!(RunStatus::from_all_ok(true).exit_code(), 0);
        assert_eq!(RunStatus::from_all_ok(false).exit_code(), 1);
    }
}
