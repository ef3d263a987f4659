//! Configuration management for flightlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::import::ImportOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "trips.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTLOG_`)
/// 2. TOML config file at `~/.config/flightlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// CSV import configuration.
    pub import: ImportConfig,
    /// Reference data configuration.
    pub reference: ReferenceConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/flightlog/trips.db`
    pub database_path: Option<PathBuf>,
}

/// CSV import configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Lines to skip at the top of an export before the first row.
    pub header_lines: usize,
    /// Field delimiter, a single ASCII character.
    pub delimiter: char,
}

/// Reference data configuration.
///
/// When a path is unset the table compiled into the binary is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// JSON file of `{code, name, city, state}` airport entries.
    pub airports_path: Option<PathBuf>,
    /// JSON file of `{name, abbr}` state entries.
    pub states_path: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let options = ImportOptions::default();
        Self {
            header_lines: options.header_lines,
            delimiter: char::from(options.delimiter),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLIGHTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let delimiter = self.import.delimiter;
        if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
            return Err(Error::ConfigValidation {
                message: format!(
                    "import delimiter {delimiter:?} must be a single ASCII character \
                     other than a quote or newline"
                ),
            });
        }

        for path in [&self.reference.airports_path, &self.reference.states_path]
            .into_iter()
            .flatten()
        {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "reference data paths cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The CSV reader options described by this configuration.
    ///
    /// Only meaningful after [`Config::validate`] has accepted the delimiter.
    #[must_use]
    pub fn import_options(&self) -> ImportOptions {
        let mut buf = [0u8; 4];
        let delimiter = self.import.delimiter.encode_utf8(&mut buf).as_bytes()[0];
        ImportOptions {
            header_lines: self.import.header_lines,
            delimiter,
        }
    }
}
