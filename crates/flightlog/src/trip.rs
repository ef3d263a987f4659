//! Core trip types for flightlog.
//!
//! A [`Trip`] (a rotation) is one multi-day work assignment and owns an
//! ordered list of [`Leg`]s. Leg order is chronological flight order and is
//! never resorted.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest rotation identifier accepted.
pub const MAX_ROTATION_LEN: usize = 10;

/// Aircraft manufacturer, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AircraftMake {
    /// Airbus (`A`).
    #[serde(rename = "A")]
    Airbus,
    /// Boeing (`B`).
    #[serde(rename = "B")]
    Boeing,
    /// Anything else (`O`).
    #[serde(rename = "O")]
    Other,
}

impl AircraftMake {
    /// All makes, in code order.
    pub const ALL: [Self; 3] = [Self::Airbus, Self::Boeing, Self::Other];

    /// The single-letter code for this make.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Airbus => 'A',
            Self::Boeing => 'B',
            Self::Other => 'O',
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Airbus => "Airbus",
            Self::Boeing => "Boeing",
            Self::Other => "Other",
        }
    }
}

impl FromStr for AircraftMake {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" => Ok(Self::Airbus),
            "B" => Ok(Self::Boeing),
            "O" => Ok(Self::Other),
            _ => Err(Error::format("aircraft make", s)),
        }
    }
}

impl fmt::Display for AircraftMake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Fuselage classification, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyType {
    /// Single aisle (`N`).
    #[serde(rename = "N")]
    Narrow,
    /// Twin aisle (`W`).
    #[serde(rename = "W")]
    Wide,
}

impl BodyType {
    /// The single-letter code for this body type.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Narrow => 'N',
            Self::Wide => 'W',
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Narrow => "Narrowbody",
            Self::Wide => "Widebody",
        }
    }
}

impl FromStr for BodyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "N" => Ok(Self::Narrow),
            "W" => Ok(Self::Wide),
            _ => Err(Error::format("aircraft body", s)),
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The aircraft a leg was flown on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aircraft {
    /// Manufacturer.
    pub make: AircraftMake,
    /// Model designation, e.g. `320` or `737-800`.
    pub model: String,
    /// Fuselage classification.
    pub body: BodyType,
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.make, self.model)
    }
}

/// A three-letter IATA airport code, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    /// Validate and normalize an airport code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] unless the input is exactly three ASCII letters.
    pub fn parse(text: &str) -> Result<Self> {
        let code = text.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(Error::format("airport code", text))
        }
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AirportCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rotation identifier: short, upper-case, alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rotation(String);

impl Rotation {
    /// Validate and normalize a rotation identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if the input is empty, too long, or contains
    /// anything other than ASCII letters and digits.
    pub fn parse(text: &str) -> Result<Self> {
        let rotation = text.trim();
        if !rotation.is_empty()
            && rotation.len() <= MAX_ROTATION_LEN
            && rotation.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Ok(Self(rotation.to_ascii_uppercase()))
        } else {
            Err(Error::format("rotation", text))
        }
    }

    /// The rotation as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Rotation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Rotation> for String {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One flight segment within a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Departure date.
    pub date: NaiveDate,
    /// Departure airport.
    pub start_airport: AirportCode,
    /// Arrival airport.
    pub end_airport: AirportCode,
    /// Block time in minutes.
    pub duration: u32,
    /// Distance flown in miles. Zero means unknown.
    pub mileage: u32,
    /// Whether the crew stayed overnight at the arrival airport.
    pub layover: bool,
    /// Aircraft flown.
    pub aircraft: Aircraft,
    /// Flight number.
    pub flight_number: u32,
}

/// A multi-day work assignment.
///
/// `trip_length` is derived from the legs and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TripRecord")]
pub struct Trip {
    /// Unique, sequentially assigned trip number.
    pub trip_number: u32,
    /// Rotation identifier.
    pub rotation: Rotation,
    trip_length: u32,
    legs: Vec<Leg>,
    /// Credit value in minutes.
    pub credit_value: u32,
    /// Time away from base in minutes.
    pub time_away_from_base: u32,
}

/// Serialized trip shape; the stored trip length is ignored and recomputed.
#[derive(Deserialize)]
struct TripRecord {
    trip_number: u32,
    rotation: Rotation,
    legs: Vec<Leg>,
    credit_value: u32,
    time_away_from_base: u32,
}

impl From<TripRecord> for Trip {
    fn from(record: TripRecord) -> Self {
        Self::new(
            record.trip_number,
            record.rotation,
            record.legs,
            record.credit_value,
            record.time_away_from_base,
        )
    }
}

impl Trip {
    /// Create a trip, deriving its length from the legs.
    #[must_use]
    pub fn new(
        trip_number: u32,
        rotation: Rotation,
        legs: Vec<Leg>,
        credit_value: u32,
        time_away_from_base: u32,
    ) -> Self {
        let trip_length = derive_trip_length(&legs);
        Self {
            trip_number,
            rotation,
            trip_length,
            legs,
            credit_value,
            time_away_from_base,
        }
    }

    /// Number of distinct date runs among the legs.
    #[must_use]
    pub fn trip_length(&self) -> u32 {
        self.trip_length
    }

    /// The legs, in flight order.
    #[must_use]
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Replace the legs and recompute the trip length.
    pub fn set_legs(&mut self, legs: Vec<Leg>) {
        self.trip_length = derive_trip_length(&legs);
        self.legs = legs;
    }

    /// Append a leg and recompute the trip length.
    pub fn push_leg(&mut self, leg: Leg) {
        self.legs.push(leg);
        self.trip_length = derive_trip_length(&self.legs);
    }
}

/// Count the runs of equal consecutive dates in an ordered leg list.
///
/// Legs are assumed to already be in chronological order; nothing is sorted.
#[must_use]
pub fn derive_trip_length(legs: &[Leg]) -> u32 {
    if legs.is_empty() {
        return 0;
    }

    legs.windows(2).fold(1, |runs, pair| {
        if pair[0].date == pair[1].date {
            runs
        } else {
            runs + 1
        }
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn leg(day: &str, from: &str, to: &str, mileage: u32) -> Leg {
        Leg {
            date: date(day),
            start_airport: AirportCode::parse(from).unwrap(),
            end_airport: AirportCode::parse(to).unwrap(),
            duration: 60,
            mileage,
            layover: false,
            aircraft: Aircraft {
                make: AircraftMake::Airbus,
                model: "320".to_string(),
                body: BodyType::Narrow,
            },
            flight_number: 100,
        }
    }

    pub fn trip(number: u32, legs: Vec<Leg>) -> Trip {
        Trip::new(number, Rotation::parse("AB12").unwrap(), legs, 300, 1200)
    }
}
