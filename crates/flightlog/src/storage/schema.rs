//! `SQLite` schema definitions for flightlog.
//!
//! A trip row owns its leg rows; `position` keeps legs in flight order.

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// One row per trip.
pub const CREATE_TRIPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS trips (
    trip_number INTEGER PRIMARY KEY,
    rotation TEXT NOT NULL,
    trip_length INTEGER NOT NULL,
    credit_value INTEGER NOT NULL CHECK (credit_value >= 0),
    time_away_from_base INTEGER NOT NULL CHECK (time_away_from_base >= 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// One row per leg, keyed by its trip and position within the trip.
pub const CREATE_LEGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS legs (
    trip_number INTEGER NOT NULL REFERENCES trips(trip_number) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    date TEXT NOT NULL,
    start_airport TEXT NOT NULL,
    end_airport TEXT NOT NULL,
    duration INTEGER NOT NULL CHECK (duration >= 0),
    mileage INTEGER NOT NULL CHECK (mileage >= 0),
    layover INTEGER NOT NULL,
    aircraft_make TEXT NOT NULL CHECK (aircraft_make IN ('A', 'B', 'O')),
    aircraft_model TEXT NOT NULL,
    aircraft_body TEXT NOT NULL CHECK (aircraft_body IN ('N', 'W')),
    flight_number INTEGER NOT NULL,
    PRIMARY KEY (trip_number, position)
)
";

/// Index for date range lookups.
pub const CREATE_LEGS_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_legs_date ON legs(date)
";

/// Statements making up schema version 1.
pub const SCHEMA_V1: &[&str] = &[
    CREATE_TRIPS_TABLE,
    CREATE_LEGS_TABLE,
    CREATE_LEGS_DATE_INDEX,
];
