//! Binary entry point for roster.
//!
//! This binary provides the CLI over the ingestion, backup and report
//! operations, and starts the HTTP API.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    ReportKind, cmd_backup, cmd_config, cmd_import, cmd_load, cmd_report, cmd_restore, cmd_serve,
};
use roster::config::{ENV_CONFIG_PATH, RosterConfig};
use roster::observability::{self, InitOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Roster - bulk ingestion and columnar backup for employee records.
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import one CSV or JSON file into a table.
    Import {
        /// File to import.
        file: PathBuf,

        /// Target table (default: the file stem).
        #[arg(short, long)]
        table: Option<String>,

        /// Records per chunk.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Empty the table before importing.
        #[arg(long)]
        truncate: bool,
    },

    /// Import every data file in a directory.
    Load {
        /// Directory to scan (default: the configured data directory).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Back up a table to a Parquet file.
    Backup {
        /// Table to back up.
        table: String,
    },

    /// Replace a table with its backup.
    Restore {
        /// Table to restore.
        table: String,
    },

    /// Run a report.
    Report {
        /// Report to run.
        #[arg(value_enum)]
        kind: ReportKind,

        /// Report year (default: 2021).
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show the resolved configuration.
    Config,
}

fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) =
        observability::init_from_settings(&config.logging, InitOptions { verbose: cli.verbose })
    {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: RosterConfig) -> roster::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => cmd_serve(config, host, port),

        Commands::Import {
            file,
            table,
            chunk_size,
            truncate,
        } => cmd_import(&config, &file, table, chunk_size, truncate),

        Commands::Load { dir } => cmd_load(&config, dir),

        Commands::Backup { table } => cmd_backup(&config, &table),

        Commands::Restore { table } => cmd_restore(&config, &table),

        Commands::Report { kind, year } => cmd_report(&config, kind, year),

        Commands::Config => cmd_config(&config),
    }
}

/// Loads configuration, then applies `ROSTER_*` environment overrides.
fn load_config(path: Option<&str>) -> roster::Result<RosterConfig> {
    let mut config = if let Some(config_path) = path {
        RosterConfig::load_from_file(std::path::Path::new(config_path))?
    } else {
        match std::env::var(ENV_CONFIG_PATH) {
            Ok(config_path) if !config_path.trim().is_empty() => {
                RosterConfig::load_from_file(std::path::Path::new(&config_path))?
            },
            _ => RosterConfig::load_default()?,
        }
    };

    config.apply_env_overrides()?;
    Ok(config)
}
