//! `flightlog` - A personal flight history tracker
//!
//! This library provides the trip model, the crew-schedule CSV importer, the
//! trip entry form, aggregate statistics, and `SQLite` storage for the
//! `flightlog` binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod display;
pub mod duration;
pub mod error;
pub mod form;
pub mod geo;
pub mod import;
pub mod logging;
pub mod stats;
pub mod storage;
pub mod trip;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{LegForm, TripForm};
pub use geo::ReferenceData;
pub use import::{parse_trips, ImportOptions};
pub use logging::init_logging;
pub use stats::Dashboard;
pub use storage::{Storage, StorageStats};
pub use trip::{Aircraft, AircraftMake, AirportCode, BodyType, Leg, Rotation, Trip};
