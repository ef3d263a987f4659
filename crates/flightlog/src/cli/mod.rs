//! Command-line interface for flightlog.
//!
//! This module provides the CLI structure for the `flightlog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AddCommand, ConfigCommand, ImportCommand, RotationsCommand, StatsCommand};

use crate::logging::Verbosity;

/// flightlog - Keep a history of the trips you have flown
///
/// Imports crew-schedule exports, records new trips, and summarizes where,
/// how far, and on what you have flown.
#[derive(Debug, Parser)]
#[command(name = "flightlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import trips from a crew-schedule CSV export
    Import(ImportCommand),

    /// Add one trip from a JSON form
    Add(AddCommand),

    /// Print the number the next trip will get
    NextNumber,

    /// List stored rotations and their legs
    Rotations(RotationsCommand),

    /// Show flying statistics
    Stats(StatsCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
