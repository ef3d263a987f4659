//! Presentation helpers.
//!
//! Number formatting for the dashboard and the rotations view, which blanks
//! repeated dates within a trip. The view borrows trips and never modifies
//! them.

use chrono::NaiveDate;

use crate::trip::{Leg, Trip};

/// Round to at most two decimal places, dropping trailing zeros and a
/// trailing decimal point.
///
/// ```
/// use flightlog::display::round_number;
///
/// assert_eq!(round_number(4.0), "4");
/// assert_eq!(round_number(4.5), "4.5");
/// assert_eq!(round_number(4.567), "4.57");
/// ```
#[must_use]
pub fn round_number(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format an integer with comma thousands separators.
#[must_use]
pub fn with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One trip as shown in the rotations table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationRow<'a> {
    /// The trip being displayed.
    pub trip: &'a Trip,
    /// Its legs, with repeated dates blanked.
    pub legs: Vec<LegRow<'a>>,
}

/// One leg line in the rotations table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegRow<'a> {
    /// The leg's date, or `None` if it repeats the previous leg's date.
    pub shown_date: Option<NaiveDate>,
    /// The leg itself.
    pub leg: &'a Leg,
}

/// Build the rotations view, blanking each leg date that equals the previous
/// leg's date within the same trip.
#[must_use]
pub fn rotation_rows(trips: &[Trip]) -> Vec<RotationRow<'_>> {
    trips
        .iter()
        .map(|trip| {
            let mut prev = None;
            let legs = trip
                .legs()
                .iter()
                .map(|leg| {
                    let shown_date = (prev != Some(leg.date)).then_some(leg.date);
                    prev = Some(leg.date);
                    LegRow { shown_date, leg }
                })
                .collect();
            RotationRow { trip, legs }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::fixtures::{date, leg, trip};

    #[test]
    fn test_round_number() {
        assert_eq!(round_number(4.0), "4");
        assert_eq!(round_number(4.5), "4.5");
        assert_eq!(round_number(4.567), "4.57");
        assert_eq!(round_number(4.501), "4.5");
        assert_eq!(round_number(0.0), "0");
        assert_eq!(round_number(100.0), "100");
        assert_eq!(round_number(0.004), "0");
    }

    #[test]
    fn test_with_commas() {
        assert_eq!(with_commas(0), "0");
        assert_eq!(with_commas(999), "999");
        assert_eq!(with_commas(1000), "1,000");
        assert_eq!(with_commas(12_345), "12,345");
        assert_eq!(with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn test_rotation_rows_blank_repeated_dates() {
        let trips = vec![
            trip(
                1,
                vec![
                    leg("2023-01-01", "MSP", "ORD", 334),
                    leg("2023-01-01", "ORD", "DEN", 888),
                    leg("2023-01-02", "DEN", "MSP", 680),
                ],
            ),
            trip(2, vec![leg("2023-01-02", "MSP", "ATL", 907)]),
        ];

        let rows = rotation_rows(&trips);
        assert_eq!(rows.len(), 2);

        let shown: Vec<_> = rows[0].legs.iter().map(|l| l.shown_date).collect();
        assert_eq!(
            shown,
            vec![Some(date("2023-01-01")), None, Some(date("2023-01-02"))]
        );

        // Blanking does not carry across trips.
        assert_eq!(rows[1].legs[0].shown_date, Some(date("2023-01-02")));
    }

    #[test]
    fn test_rotation_rows_leave_trips_untouched() {
        let trips = vec![trip(
            1,
            vec![
                leg("2023-01-01", "MSP", "ORD", 334),
                leg("2023-01-01", "ORD", "MSP", 334),
            ],
        )];
        let before = trips.clone();

        let _rows = rotation_rows(&trips);
        assert_eq!(trips, before);
        assert_eq!(trips[0].legs()[1].date, date("2023-01-01"));
    }
}
