//! CSV import of exported trip spreadsheets.
//!
//! The export has a couple of header lines followed by one row per leg. Trip
//! level columns (trip number, rotation, credit, time away) are only filled
//! in on a trip's first row, and the date only on the first leg of each day,
//! so both are carried forward while folding over the rows.
//!
//! Any bad row aborts the whole import.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::duration;
use crate::error::{Error, Result};
use crate::trip::{Aircraft, AirportCode, Leg, Rotation, Trip};

/// Number of columns in every row.
pub const COLUMN_COUNT: usize = 15;

/// Date layout used by the export.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

const TRIP_NUMBER: usize = 0;
const ROTATION: usize = 1;
const TRIP_LENGTH: usize = 2;
const DATE: usize = 3;
const DEPARTURE: usize = 4;
const ARRIVAL: usize = 5;
const BLOCK_TIME: usize = 6;
const MILEAGE: usize = 7;
const LAYOVER: usize = 8;
const MAKE: usize = 9;
const MODEL: usize = 10;
const BODY: usize = 11;
const FLIGHT_NUMBER: usize = 12;
const CREDIT_VALUE: usize = 13;
const TIME_AWAY: usize = 14;

const COLUMN_NAMES: [&str; COLUMN_COUNT] = [
    "trip number",
    "rotation",
    "trip length",
    "date",
    "departure",
    "arrival",
    "block time",
    "mileage",
    "layover",
    "aircraft make",
    "aircraft model",
    "aircraft body",
    "flight number",
    "credit value",
    "time away",
];

/// Options controlling how the text is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Lines to skip before the first data row.
    pub header_lines: usize,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_lines: 2,
            delimiter: b',',
        }
    }
}

/// Parse exported CSV text into trips, in file order.
///
/// # Errors
///
/// Returns [`Error::Parse`] for the first row that cannot be decoded, or
/// [`Error::Csv`] if the text is not readable as CSV. No trips are returned
/// on failure.
pub fn parse_trips(text: &str, options: &ImportOptions) -> Result<Vec<Trip>> {
    let body = text.splitn(options.header_lines + 1, '\n').nth(options.header_lines);
    let Some(body) = body else {
        return Ok(Vec::new());
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(options.delimiter)
        .from_reader(body.as_bytes());

    let state = reader
        .records()
        .try_fold(ImportState::default(), |state, record| {
            let record = record?;
            let line = options.header_lines + record_line(body, &record);
            state.step(&Row::new(line, &record)?)
        })?;

    let trips = state.finish();
    info!(
        trips = trips.len(),
        legs = trips.iter().map(|t| t.legs().len()).sum::<usize>(),
        "Parsed CSV import"
    );
    Ok(trips)
}

/// 1-based line of a record within `body`, counted from the record's byte
/// offset so CRLF endings and skipped blank lines stay accurate.
fn record_line(body: &str, record: &StringRecord) -> usize {
    let offset = record
        .position()
        .map_or(0, |p| usize::try_from(p.byte()).unwrap_or(usize::MAX));
    let before = body.get(..offset).unwrap_or(body);
    1 + before.bytes().filter(|&b| b == b'\n').count()
}

/// Accumulator for the fold over rows.
#[derive(Debug, Default)]
struct ImportState {
    trips: Vec<Trip>,
    current: Option<TripBuilder>,
    last_date: Option<NaiveDate>,
}

impl ImportState {
    fn step(mut self, row: &Row<'_>) -> Result<Self> {
        if row.starts_trip() {
            if let Some(done) = self.current.take() {
                self.trips.push(done.build());
            }
            self.current = Some(TripBuilder::from_row(row)?);
            self.last_date = None;
        }

        if let Some(date) = row.date()? {
            self.last_date = Some(date);
        }

        let Some(current) = self.current.as_mut() else {
            return Err(row.error(TRIP_NUMBER, "leg row appears before any trip number"));
        };
        let Some(date) = self.last_date else {
            return Err(row.error(DATE, "the first row of a trip needs a date"));
        };

        current.legs.push(row.leg(date)?);
        Ok(self)
    }

    fn finish(mut self) -> Vec<Trip> {
        if let Some(done) = self.current.take() {
            self.trips.push(done.build());
        }
        self.trips
    }
}

/// A trip whose legs are still being collected.
#[derive(Debug)]
struct TripBuilder {
    line: usize,
    trip_number: u32,
    rotation: Rotation,
    declared_length: Option<u32>,
    credit_value: u32,
    time_away_from_base: u32,
    legs: Vec<Leg>,
}

impl TripBuilder {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let trip_number = row.number(TRIP_NUMBER)?;
        debug!(trip_number, line = row.line, "Starting trip");

        let declared_length = if row.cell(TRIP_LENGTH).is_empty() {
            None
        } else {
            Some(row.number(TRIP_LENGTH)?)
        };

        Ok(Self {
            line: row.line,
            trip_number,
            rotation: Rotation::parse(row.cell(ROTATION))
                .map_err(|_| row.error(ROTATION, "expected 1-10 letters or digits"))?,
            declared_length,
            credit_value: row.duration(CREDIT_VALUE)?,
            time_away_from_base: row.duration(TIME_AWAY)?,
            legs: Vec::new(),
        })
    }

    fn build(self) -> Trip {
        let trip = Trip::new(
            self.trip_number,
            self.rotation,
            self.legs,
            self.credit_value,
            self.time_away_from_base,
        );

        if let Some(declared) = self.declared_length {
            if declared != trip.trip_length() {
                warn!(
                    trip_number = trip.trip_number,
                    line = self.line,
                    declared,
                    derived = trip.trip_length(),
                    "Trip length column disagrees with leg dates, using derived length"
                );
            }
        }
        trip
    }
}

/// One data row with its line number, for cell decoding and error reporting.
#[derive(Debug)]
struct Row<'r> {
    line: usize,
    record: &'r StringRecord,
}

impl<'r> Row<'r> {
    fn new(line: usize, record: &'r StringRecord) -> Result<Self> {
        if record.len() != COLUMN_COUNT {
            return Err(Error::parse(
                line,
                "row",
                record.iter().collect::<Vec<_>>().join(","),
                format!("expected {COLUMN_COUNT} columns, found {}", record.len()),
            ));
        }
        Ok(Self { line, record })
    }

    fn cell(&self, column: usize) -> &'r str {
        self.record.get(column).unwrap_or_default()
    }

    fn error(&self, column: usize, reason: &str) -> Error {
        Error::parse(self.line, COLUMN_NAMES[column], self.cell(column), reason)
    }

    fn starts_trip(&self) -> bool {
        !self.cell(TRIP_NUMBER).is_empty()
    }

    fn number(&self, column: usize) -> Result<u32> {
        self.cell(column)
            .parse()
            .map_err(|_| self.error(column, "expected a whole number"))
    }

    fn duration(&self, column: usize) -> Result<u32> {
        duration::to_minutes(self.cell(column))
            .map_err(|_| self.error(column, "expected a duration like H:MM"))
    }

    fn date(&self) -> Result<Option<NaiveDate>> {
        let cell = self.cell(DATE);
        if cell.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(cell, DATE_FORMAT)
            .map(Some)
            .map_err(|_| self.error(DATE, "expected a date like mm/dd/yyyy"))
    }

    fn airport(&self, column: usize) -> Result<AirportCode> {
        AirportCode::parse(self.cell(column))
            .map_err(|_| self.error(column, "expected a three letter airport code"))
    }

    fn leg(&self, date: NaiveDate) -> Result<Leg> {
        Ok(Leg {
            date,
            start_airport: self.airport(DEPARTURE)?,
            end_airport: self.airport(ARRIVAL)?,
            duration: self.duration(BLOCK_TIME)?,
            mileage: self.number(MILEAGE)?,
            layover: !self.cell(LAYOVER).is_empty(),
            aircraft: Aircraft {
                make: self
                    .cell(MAKE)
                    .parse()
                    .map_err(|_| self.error(MAKE, "expected A, B or O"))?,
                model: self.cell(MODEL).to_string(),
                body: self
                    .cell(BODY)
                    .parse()
                    .map_err(|_| self.error(BODY, "expected N or W"))?,
            },
            flight_number: self.number(FLIGHT_NUMBER)?,
        })
    }
}
