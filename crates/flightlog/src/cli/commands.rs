//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Import command arguments.
#[derive(Debug, Args)]
pub struct ImportCommand {
    /// Crew-schedule CSV export to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Parse and report without writing to the database
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the parsed trips as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Header lines to skip (overrides the configured value)
    #[arg(long, value_name = "N")]
    pub header_lines: Option<usize>,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// JSON trip form to read ("-" for stdin)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Validate and print the trip without storing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Rotations command arguments.
#[derive(Debug, Args)]
pub struct RotationsCommand {
    /// Output stored trips as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output the dashboard as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
