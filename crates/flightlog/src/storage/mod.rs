//! Storage layer for flightlog.
//!
//! Trips and their legs live in `SQLite`. Row identity stays inside this
//! module; callers only ever see [`Trip`] values keyed by trip number.

pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::trip::{Aircraft, AirportCode, Leg, Rotation, Trip};

/// Date layout used in the `legs.date` column.
const STORED_DATE_FORMAT: &str = "%Y-%m-%d";

const MEMORY_PATH: &str = ":memory:";

/// Persistent trip store.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a trip database at the given path.
    ///
    /// Missing parent directories are created and the schema is brought up
    /// to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!(path = %path.display(), "Opening trip database");
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        migrations::initialize_schema(&conn)?;

        info!(path = %path.display(), "Trip database ready");
        Ok(Self { path, conn })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored trip, ordered by trip number, legs in flight order.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row cannot be decoded.
    pub fn list_trips(&self) -> Result<Vec<Trip>> {
        let mut legs = self.load_legs(None)?;

        let mut stmt = self.conn.prepare(
            r"
            SELECT trip_number, rotation, credit_value, time_away_from_base
            FROM trips ORDER BY trip_number ASC
            ",
        )?;
        let rows = stmt
            .query_map([], TripRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let trip_legs = legs.remove(&row.trip_number).unwrap_or_default();
                row.into_trip(trip_legs)
            })
            .collect()
    }

    /// Look up one trip by number.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored row cannot be decoded.
    pub fn get(&self, trip_number: u32) -> Result<Option<Trip>> {
        let row = self
            .conn
            .query_row(
                r"
                SELECT trip_number, rotation, credit_value, time_away_from_base
                FROM trips WHERE trip_number = ?1
                ",
                [trip_number],
                TripRow::from_row,
            )
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };
        let legs = self
            .load_legs(Some(trip_number))?
            .remove(&trip_number)
            .unwrap_or_default();
        row.into_trip(legs).map(Some)
    }

    /// Store a trip and all of its legs in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTrip`] if the trip number is already taken,
    /// or a database error if any write fails. Nothing is written on error.
    pub fn append_trip(&self, trip: &Trip) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM trips WHERE trip_number = ?1)",
            [trip.trip_number],
            |row| row.get(0),
        )?;
        if taken {
            return Err(Error::DuplicateTrip {
                trip_number: trip.trip_number,
            });
        }

        tx.execute(
            r"
            INSERT INTO trips (
                trip_number, rotation, trip_length, credit_value, time_away_from_base
            )
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                trip.trip_number,
                trip.rotation.as_str(),
                trip.trip_length(),
                trip.credit_value,
                trip.time_away_from_base,
            ],
        )?;

        {
            let mut insert_leg = tx.prepare(
                r"
                INSERT INTO legs (
                    trip_number, position, date, start_airport, end_airport, duration,
                    mileage, layover, aircraft_make, aircraft_model, aircraft_body, flight_number
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                ",
            )?;
            for (position, leg) in (0u32..).zip(trip.legs()) {
                insert_leg.execute(params![
                    trip.trip_number,
                    position,
                    leg.date.format(STORED_DATE_FORMAT).to_string(),
                    leg.start_airport.as_str(),
                    leg.end_airport.as_str(),
                    leg.duration,
                    leg.mileage,
                    leg.layover,
                    leg.aircraft.make.code().to_string(),
                    leg.aircraft.model,
                    leg.aircraft.body.code().to_string(),
                    leg.flight_number,
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            trip_number = trip.trip_number,
            legs = trip.legs().len(),
            "Stored trip"
        );
        Ok(())
    }

    /// Store trips one at a time, stopping at the first failure.
    ///
    /// Trips written before the failure stay written.
    pub fn append_all(&self, trips: &[Trip]) -> BulkAppend {
        for (written, trip) in trips.iter().enumerate() {
            if let Err(error) = self.append_trip(trip) {
                warn!(
                    trip_number = trip.trip_number,
                    written,
                    "Stopping bulk append: {error}"
                );
                return BulkAppend {
                    written,
                    error: Some(error),
                };
            }
        }

        info!(written = trips.len(), "Stored trips");
        BulkAppend {
            written: trips.len(),
            error: None,
        }
    }

    /// Number of stored trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))?;
        Ok(count)
    }

    /// The number the next new trip should get: stored trips plus one.
    ///
    /// Not reserved; two writers asking at once get the same answer and the
    /// second append fails with [`Error::DuplicateTrip`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn next_trip_number(&self) -> Result<u32> {
        Ok(self.count()? + 1)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let trips = self.count()?;
        let legs: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM legs", [], |row| row.get(0))?;

        let (first, last): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM legs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map_or(0, |m| m.len())
        };

        Ok(StorageStats {
            trips,
            legs,
            first_flight: first.and_then(|d| parse_stored_date(&d).ok()),
            last_flight: last.and_then(|d| parse_stored_date(&d).ok()),
            db_size_bytes,
        })
    }

    /// Load leg rows grouped by trip number, each group in position order.
    fn load_legs(&self, trip_number: Option<u32>) -> Result<BTreeMap<u32, Vec<Leg>>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT trip_number, date, start_airport, end_airport, duration, mileage,
                   layover, aircraft_make, aircraft_model, aircraft_body, flight_number
            FROM legs
            WHERE ?1 IS NULL OR trip_number = ?1
            ORDER BY trip_number ASC, position ASC
            ",
        )?;
        let rows = stmt
            .query_map([trip_number], LegRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut grouped: BTreeMap<u32, Vec<Leg>> = BTreeMap::new();
        for row in rows {
            let trip_number = row.trip_number;
            let leg = row.into_leg()?;
            grouped.entry(trip_number).or_default().push(leg);
        }
        Ok(grouped)
    }
}

/// Result of [`Storage::append_all`].
#[derive(Debug)]
#[must_use]
pub struct BulkAppend {
    /// Trips stored before stopping.
    pub written: usize,
    /// The failure that stopped the run, if any.
    pub error: Option<Error>,
}

impl BulkAppend {
    /// The written count, or the error that stopped the run.
    ///
    /// # Errors
    ///
    /// Returns the error recorded by [`Storage::append_all`].
    pub fn into_result(self) -> Result<usize> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.written),
        }
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Stored trips.
    pub trips: u32,
    /// Stored legs across all trips.
    pub legs: u32,
    /// Earliest leg date.
    pub first_flight: Option<NaiveDate>,
    /// Latest leg date.
    pub last_flight: Option<NaiveDate>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

/// Raw trip columns.
struct TripRow {
    trip_number: u32,
    rotation: String,
    credit_value: u32,
    time_away_from_base: u32,
}

impl TripRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            trip_number: row.get(0)?,
            rotation: row.get(1)?,
            credit_value: row.get(2)?,
            time_away_from_base: row.get(3)?,
        })
    }

    fn into_trip(self, legs: Vec<Leg>) -> Result<Trip> {
        let rotation = Rotation::parse(&self.rotation).map_err(|e| Error::CorruptRecord {
            trip_number: self.trip_number,
            message: e.to_string(),
        })?;
        Ok(Trip::new(
            self.trip_number,
            rotation,
            legs,
            self.credit_value,
            self.time_away_from_base,
        ))
    }
}

/// Raw leg columns.
struct LegRow {
    trip_number: u32,
    date: String,
    start_airport: String,
    end_airport: String,
    duration: u32,
    mileage: u32,
    layover: bool,
    make: String,
    model: String,
    body: String,
    flight_number: u32,
}

impl LegRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            trip_number: row.get(0)?,
            date: row.get(1)?,
            start_airport: row.get(2)?,
            end_airport: row.get(3)?,
            duration: row.get(4)?,
            mileage: row.get(5)?,
            layover: row.get(6)?,
            make: row.get(7)?,
            model: row.get(8)?,
            body: row.get(9)?,
            flight_number: row.get(10)?,
        })
    }

    fn into_leg(self) -> Result<Leg> {
        let trip_number = self.trip_number;
        let corrupt = |e: Error| Error::CorruptRecord {
            trip_number,
            message: e.to_string(),
        };

        Ok(Leg {
            date: parse_stored_date(&self.date).map_err(corrupt)?,
            start_airport: AirportCode::parse(&self.start_airport).map_err(corrupt)?,
            end_airport: AirportCode::parse(&self.end_airport).map_err(corrupt)?,
            duration: self.duration,
            mileage: self.mileage,
            layover: self.layover,
            aircraft: Aircraft {
                make: self.make.parse().map_err(corrupt)?,
                model: self.model,
                body: self.body.parse().map_err(corrupt)?,
            },
            flight_number: self.flight_number,
        })
    }
}

fn parse_stored_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, STORED_DATE_FORMAT).map_err(|_| Error::format("date", text))
}
