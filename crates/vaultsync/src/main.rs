//! vaultsync - Mirror tasks, habits and memos into a linked Markdown vault

mod cli;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vaultsync_core::{open_snapshot, remove_conflict_files, run_sync, SyncConfig};

#[derive(Parser)]
#[command(
    name = "vaultsync",
    version,
    about = "Mirror tasks, habits and memos into a linked Markdown vault",
    long_about = "Renders one note per task, daily/weekly/monthly summaries, memo\n\
                  digests and a unified project index from a snapshot of task-manager\n\
                  records. Re-running is cheap: unchanged tasks are never rewritten.\n\
                  \n\
                  Examples:\n\
                    vaultsync --input ./snapshot --output ~/vault sync\n\
                    vaultsync sync --date 2024-05-01      # Summaries for another day\n\
                    vaultsync clean                       # Remove sync-conflict copies\n\
                  \n\
                  Environment Variables:\n\
                    VAULTSYNC_CONFIG                      # Config file path\n\
                    VAULTSYNC_OUTPUT_DIR                  # Vault root (overrides config)\n\
                    VAULTSYNC_INPUT_DIR                   # Snapshot directory\n\
                    RUST_LOG                              # Log filter (default: info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Config file (default: <config dir>/vaultsync/config.toml when present)
    #[arg(long, env = "VAULTSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Vault root directory
    #[arg(long, env = "VAULTSYNC_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Directory of JSON record exports
    #[arg(long, env = "VAULTSYNC_INPUT_DIR")]
    input: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Disable ANSI colors in the summary table
    #[arg(long, env = "VAULTSYNC_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Export the snapshot into the vault (default)
    Sync {
        /// Day the calendar and memo summaries are built for (default: today)
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
        /// Keep sync-conflict files
        #[arg(long)]
        no_clean: bool,
    },
    /// Remove sync-conflict files from the vault and exit
    Clean,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    fmt().with_env_filter(filter).with_target(false).init();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when the run finished with failed documents
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;

    match cli.mode {
        Some(Mode::Sync { date, no_clean }) => {
            run_sync_mode(&config, cli.input, date, no_clean, cli.no_color)
        }
        None => run_sync_mode(&config, cli.input, None, false, cli.no_color),
        Some(Mode::Clean) => {
            run_clean(&config);
            Ok(true)
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("vaultsync").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Defaults, then the config file, then environment and flags
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => SyncConfig::load(&path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SyncConfig::default(),
    };

    if let Some(output) = &cli.output {
        config.output_root = output.clone();
    }
    Ok(config)
}

fn run_sync_mode(
    config: &SyncConfig,
    input: Option<PathBuf>,
    date: Option<NaiveDate>,
    no_clean: bool,
    no_color: bool,
) -> Result<bool> {
    let input = input.context("No snapshot directory given (use --input or VAULTSYNC_INPUT_DIR)")?;
    let time = config.time_normalizer()?;
    let today = date.unwrap_or_else(|| time.now().date_naive());

    let source = open_snapshot(&input, time)?;
    info!(
        input = %input.display(),
        output = %config.output_root.display(),
        date = %today,
        "Starting sync"
    );
    let report = run_sync(&source, config, today)?;
    info!(written = report.writes(), "Vault updated");

    if !no_clean {
        run_clean(config);
    }

    println!("{}", cli::format_sync_report(&report, no_color));
    Ok(!report.has_failures())
}

fn run_clean(config: &SyncConfig) {
    let removed = remove_conflict_files(&config.output_root);
    info!(removed, root = %config.output_root.display(), "Conflict cleanup finished");
}
