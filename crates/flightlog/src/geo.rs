//! Airport to US state attribution.
//!
//! Two lookup tables drive this: airport code to airport (with its state
//! name), and state name to two-letter abbreviation. A leg whose arrival
//! airport misses either table simply isn't counted.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::trip::Leg;

const BUILTIN_AIRPORTS: &str = include_str!("../data/airports.json");
const BUILTIN_STATES: &str = include_str!("../data/states.json");

/// An airport entry from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA code.
    pub code: String,
    /// Airport name.
    pub name: String,
    /// City served.
    pub city: String,
    /// Full state (or province) name.
    pub state: String,
}

/// A state entry from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Full name, e.g. `Minnesota`.
    pub name: String,
    /// Postal abbreviation, e.g. `MN`.
    pub abbr: String,
}

/// Immutable airport and state lookup tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    airports: HashMap<String, Airport>,
    states: HashMap<String, String>,
}

impl ReferenceData {
    /// Build lookup tables from parsed entries.
    #[must_use]
    pub fn new(airports: Vec<Airport>, states: Vec<State>) -> Self {
        Self {
            airports: airports
                .into_iter()
                .map(|a| (a.code.to_ascii_uppercase(), a))
                .collect(),
            states: states.into_iter().map(|s| (s.name, s.abbr)).collect(),
        }
    }

    /// The tables compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON is malformed.
    pub fn builtin() -> Result<Self> {
        Self::load(None, None)
    }

    /// Load tables, reading each from a file when a path is given and falling
    /// back to the built-in copy otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReferenceData`] if a file cannot be read or parsed.
    pub fn load(airports_path: Option<&Path>, states_path: Option<&Path>) -> Result<Self> {
        let airports: Vec<Airport> = match airports_path {
            Some(path) => read_table(path)?,
            None => serde_json::from_str(BUILTIN_AIRPORTS)?,
        };
        let states: Vec<State> = match states_path {
            Some(path) => read_table(path)?,
            None => serde_json::from_str(BUILTIN_STATES)?,
        };

        debug!(
            airports = airports.len(),
            states = states.len(),
            "Loaded reference data"
        );
        Ok(Self::new(airports, states))
    }

    /// Look up an airport by code.
    #[must_use]
    pub fn airport(&self, code: &str) -> Option<&Airport> {
        self.airports.get(code)
    }

    /// The state abbreviation for an airport, if it is a known domestic one.
    #[must_use]
    pub fn state_abbr(&self, code: &str) -> Option<&str> {
        let airport = self.airports.get(code)?;
        self.states.get(&airport.state).map(String::as_str)
    }

    /// Number of airports in the table.
    #[must_use]
    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::ReferenceData {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| Error::ReferenceData {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Count legs by the state of their arrival airport.
///
/// Legs ending at unknown or non-US airports are skipped.
pub fn state_visits<'a>(
    reference: &ReferenceData,
    legs: impl IntoIterator<Item = &'a Leg>,
) -> BTreeMap<String, u32> {
    let mut visits = BTreeMap::new();

    for leg in legs {
        let code = leg.end_airport.as_str();
        match reference.state_abbr(code) {
            Some(abbr) => *visits.entry(abbr.to_string()).or_insert(0) += 1,
            None => trace!(airport = %code, "No state for airport, skipping"),
        }
    }

    visits
}
