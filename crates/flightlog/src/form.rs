//! Trip entry form.
//!
//! A form holds exactly what the user typed, as strings. Converting it into a
//! [`Trip`] validates every field and fails on the first bad one, so a trip
//! is never partially built from a form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration;
use crate::error::{Error, Result};
use crate::trip::{Aircraft, AirportCode, Leg, Rotation, Trip};

/// Date layout accepted on the form.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// A submitted trip, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripForm {
    /// Rotation identifier.
    pub rotation: String,
    /// Credit value as "H:MM".
    pub credit_value: String,
    /// Time away from base as "H:MM".
    pub time_away_from_base: String,
    /// Legs in flight order.
    pub legs: Vec<LegForm>,
}

/// A submitted leg, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegForm {
    /// Departure date as `yyyy-mm-dd`.
    pub date: String,
    /// Departure airport code.
    pub start_airport: String,
    /// Arrival airport code.
    pub end_airport: String,
    /// Block time as "H:MM".
    pub duration: String,
    /// Distance in miles.
    pub mileage: String,
    /// Whether the crew stayed overnight at the arrival airport.
    #[serde(default)]
    pub layover: bool,
    /// `A`, `B` or `O`.
    pub make: String,
    /// Model designation.
    pub model: String,
    /// `N` or `W`.
    pub body: String,
    /// Flight number.
    pub flight_number: String,
}

impl TripForm {
    /// Validate the form and build a trip with the given number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] naming the first field that fails validation.
    pub fn into_trip(self, trip_number: u32) -> Result<Trip> {
        let rotation = Rotation::parse(&self.rotation)?;
        let credit_value = duration_field("credit value", &self.credit_value)?;
        let time_away_from_base = duration_field("time away from base", &self.time_away_from_base)?;

        if self.legs.is_empty() {
            return Err(Error::format("legs", "a trip needs at least one leg"));
        }

        let mut previous_date = None;
        let mut legs = Vec::with_capacity(self.legs.len());
        for form in self.legs {
            let leg = form.into_leg(previous_date)?;
            previous_date = Some(leg.date);
            legs.push(leg);
        }

        Ok(Trip::new(
            trip_number,
            rotation,
            legs,
            credit_value,
            time_away_from_base,
        ))
    }
}

impl LegForm {
    /// Validate the form and build a leg.
    ///
    /// A blank date repeats `previous_date`, the date of the leg before it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] naming the first field that fails validation,
    /// including a blank date with no previous leg to take it from.
    pub fn into_leg(self, previous_date: Option<NaiveDate>) -> Result<Leg> {
        let date = match (self.date.trim(), previous_date) {
            ("", Some(previous)) => previous,
            (text, _) => NaiveDate::parse_from_str(text, FORM_DATE_FORMAT)
                .map_err(|_| Error::format("date", &self.date))?,
        };

        Ok(Leg {
            date,
            start_airport: AirportCode::parse(&self.start_airport)?,
            end_airport: AirportCode::parse(&self.end_airport)?,
            duration: duration_field("block time", &self.duration)?,
            mileage: number_field("mileage", &self.mileage)?,
            layover: self.layover,
            aircraft: Aircraft {
                make: self.make.parse()?,
                model: self.model.trim().to_string(),
                body: self.body.parse()?,
            },
            flight_number: number_field("flight number", &self.flight_number)?,
        })
    }
}

fn duration_field(field: &'static str, value: &str) -> Result<u32> {
    duration::to_minutes(value).map_err(|_| Error::format(field, value))
}

fn number_field(field: &'static str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::format(field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::fixtures::date;

    fn leg_form(day: &str, from: &str, to: &str) -> LegForm {
        LegForm {
            date: day.to_string(),
            start_airport: from.to_string(),
            end_airport: to.to_string(),
            duration: "2:05".to_string(),
            mileage: "680".to_string(),
            layover: false,
            make: "B".to_string(),
            model: "737-800".to_string(),
            body: "N".to_string(),
            flight_number: "1234".to_string(),
        }
    }

    fn trip_form() -> TripForm {
        TripForm {
            rotation: "ab12".to_string(),
            credit_value: "10:30".to_string(),
            time_away_from_base: "52:15".to_string(),
            legs: vec![
                leg_form("2023-06-01", "msp", "den"),
                leg_form("2023-06-02", "DEN", "MSP"),
            ],
        }
    }

    #[test]
    fn test_into_trip() {
        let trip = trip_form().into_trip(12).unwrap();

        assert_eq!(trip.trip_number, 12);
        assert_eq!(trip.rotation.as_str(), "AB12");
        assert_eq!(trip.credit_value, 630);
        assert_eq!(trip.time_away_from_base, 52 * 60 + 15);
        assert_eq!(trip.trip_length(), 2);

        let leg = &trip.legs()[0];
        assert_eq!(leg.date, date("2023-06-01"));
        assert_eq!(leg.start_airport.as_str(), "MSP");
        assert_eq!(leg.duration, 125);
        assert_eq!(leg.aircraft.model, "737-800");
    }

    #[test]
    fn test_bad_duration_names_field() {
        let mut form = trip_form();
        form.credit_value = "10.5".to_string();

        let err = form.into_trip(1).unwrap_err();
        assert!(matches!(err, Error::Format { field: "credit value", .. }));
    }

    #[test]
    fn test_bad_airport() {
        let mut form = trip_form();
        form.legs[1].end_airport = "MS".to_string();

        let err = form.into_trip(1).unwrap_err();
        assert!(matches!(err, Error::Format { field: "airport code", .. }));
    }

    #[test]
    fn test_bad_make_and_body() {
        let mut form = trip_form();
        form.legs[0].make = "Q".to_string();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "aircraft make", .. }
        ));

        let mut form = trip_form();
        form.legs[0].body = "X".to_string();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "aircraft body", .. }
        ));
    }

    #[test]
    fn test_bad_numbers() {
        let mut form = trip_form();
        form.legs[0].mileage = "-5".to_string();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "mileage", .. }
        ));

        let mut form = trip_form();
        form.legs[0].flight_number = "DL12".to_string();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "flight number", .. }
        ));
    }

    #[test]
    fn test_bad_date() {
        let mut form = trip_form();
        form.legs[0].date = "06/01/2023".to_string();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "date", .. }
        ));
    }

    #[test]
    fn test_blank_date_repeats_previous_leg() {
        let mut form = trip_form();
        form.legs[1].date = String::new();
        form.legs.push(leg_form("", "MSP", "ORD"));

        let trip = form.into_trip(1).unwrap();
        let dates: Vec<_> = trip.legs().iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![date("2023-06-01"); 3]);
        assert_eq!(trip.trip_length(), 1);
    }

    #[test]
    fn test_blank_date_after_dated_leg() {
        let mut form = trip_form();
        form.legs.push(leg_form("  ", "MSP", "ORD"));

        let trip = form.into_trip(1).unwrap();
        assert_eq!(trip.legs()[2].date, date("2023-06-02"));
        assert_eq!(trip.trip_length(), 2);
    }

    #[test]
    fn test_first_leg_needs_date() {
        let mut form = trip_form();
        form.legs[0].date = String::new();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "date", .. }
        ));
    }

    #[test]
    fn test_no_legs() {
        let mut form = trip_form();
        form.legs.clear();
        assert!(matches!(
            form.into_trip(1).unwrap_err(),
            Error::Format { field: "legs", .. }
        ));
    }

    #[test]
    fn test_form_from_json() {
        let json = r#"{
            "rotation": "XY9",
            "credit_value": "5:00",
            "time_away_from_base": "20:00",
            "legs": [{
                "date": "2023-01-01", "start_airport": "MSP", "end_airport": "ORD",
                "duration": "1:30", "mileage": "334", "make": "A", "model": "320",
                "body": "N", "flight_number": "100"
            }]
        }"#;
        let form: TripForm = serde_json::from_str(json).unwrap();
        assert!(!form.legs[0].layover);

        let trip = form.into_trip(1).unwrap();
        assert_eq!(trip.legs()[0].mileage, 334);
    }
}
