//! prism-cli entry point
//!
//! Exit codes: 0 = every non-skipped row succeeded, 1 = run completed with
//! row-level failures, 2 = fatal setup or persistence error.

mod api;
mod cli;
mod config;
mod excel;
mod reconcile;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, RunStatus, commands};
use config::Config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(status) => status.exit_code(),
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            2
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<RunStatus> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            out,
            limit,
            workbook,
        } => commands::fetch::run(&config, &out, limit, workbook.as_deref()).await,
        Commands::Check {
            workbook,
            dry_run,
            case_sensitive,
        } => commands::check::run(&config, workbook.as_deref(), dry_run, case_sensitive),
        Commands::Apply { workbook, dry_run } => {
            commands::apply::run(&config, workbook.as_deref(), dry_run).await
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
