//! Error types for flightlog.
//!
//! This module defines all error types used throughout the flightlog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// A user-entered field does not match its expected lexical pattern.
    #[error("invalid {field}: '{value}'")]
    Format {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value that was rejected.
        value: String,
    },

    /// A CSV import row could not be turned into a trip or leg.
    #[error("line {line}, column '{column}': {reason} (value: '{value}')")]
    Parse {
        /// 1-based line number in the imported text.
        line: usize,
        /// Name of the offending column.
        column: &'static str,
        /// The raw cell value.
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The CSV reader itself failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Storage Errors ===
    /// A trip with the same number is already stored.
    #[error("trip {trip_number} already exists")]
    DuplicateTrip {
        /// The conflicting trip number.
        trip_number: u32,
    },

    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored row no longer decodes into a trip.
    #[error("corrupt record for trip {trip_number}: {message}")]
    CorruptRecord {
        /// Trip the row belongs to.
        trip_number: u32,
        /// Description of the problem.
        message: String,
    },

    // === Reference Data Errors ===
    /// Failed to load an airport or state lookup table.
    #[error("failed to load reference data from {path}: {message}")]
    ReferenceData {
        /// Where the table was read from.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for flightlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a format error for a field.
    #[must_use]
    pub fn format(field: &'static str, value: impl Into<String>) -> Self {
        Self::Format {
            field,
            value: value.into(),
        }
    }

    /// Create a CSV parse error.
    #[must_use]
    pub fn parse(
        line: usize,
        column: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            line,
            column,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is a rejected store write.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateTrip { .. })
    }
}
