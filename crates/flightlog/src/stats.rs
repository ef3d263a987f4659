//! Aggregate statistics over recorded trips.
//!
//! Every function here is a pure reduction over a snapshot of trips or their
//! flattened legs. None of them reorder or modify their input.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::display::round_number;
use crate::geo::{state_visits, ReferenceData};
use crate::trip::{AircraftMake, BodyType, Leg, Trip};

/// Earth's circumference in miles.
pub const GLOBE_MILES: f64 = 24_880.0;

/// Mean Earth to Moon distance in miles.
pub const MOON_MILES: f64 = 237_674.0;

/// All legs of all trips, in trip then flight order.
pub fn all_legs(trips: &[Trip]) -> impl Iterator<Item = &Leg> {
    trips.iter().flat_map(|trip| trip.legs().iter())
}

/// Totals for one aircraft make and model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AircraftSummary {
    /// Manufacturer.
    pub make: AircraftMake,
    /// Model designation.
    pub model: String,
    /// Number of legs flown.
    pub count: usize,
    /// Summed block time in minutes.
    pub duration: u64,
    /// Summed miles.
    pub mileage: u64,
}

/// Group legs by make and model, sorted by make then model.
pub fn by_aircraft<'a>(legs: impl IntoIterator<Item = &'a Leg>) -> Vec<AircraftSummary> {
    let mut groups: HashMap<(AircraftMake, &str), AircraftSummary> = HashMap::new();

    for leg in legs {
        let aircraft = &leg.aircraft;
        let summary = groups
            .entry((aircraft.make, aircraft.model.as_str()))
            .or_insert_with(|| AircraftSummary {
                make: aircraft.make,
                model: aircraft.model.clone(),
                count: 0,
                duration: 0,
                mileage: 0,
            });
        summary.count += 1;
        summary.duration += u64::from(leg.duration);
        summary.mileage += u64::from(leg.mileage);
    }

    let mut rows: Vec<_> = groups.into_values().collect();
    rows.sort_by(|a, b| a.make.cmp(&b.make).then_with(|| a.model.cmp(&b.model)));
    rows
}

/// Credit and time-away ranges for trips of one length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripLengthSummary {
    /// Trip length in days.
    pub trip_length: u32,
    /// Number of trips of this length.
    pub count: usize,
    /// Lowest credit value, minutes.
    pub credit_min: u32,
    /// Highest credit value, minutes.
    pub credit_max: u32,
    /// Shortest time away from base, minutes.
    pub time_away_min: u32,
    /// Longest time away from base, minutes.
    pub time_away_max: u32,
}

/// Group trips by length, ascending.
pub fn by_trip_length<'a>(trips: impl IntoIterator<Item = &'a Trip>) -> Vec<TripLengthSummary> {
    let mut groups: BTreeMap<u32, TripLengthSummary> = BTreeMap::new();

    for trip in trips {
        let credit = trip.credit_value;
        let away = trip.time_away_from_base;
        groups
            .entry(trip.trip_length())
            .and_modify(|s| {
                s.count += 1;
                s.credit_min = s.credit_min.min(credit);
                s.credit_max = s.credit_max.max(credit);
                s.time_away_min = s.time_away_min.min(away);
                s.time_away_max = s.time_away_max.max(away);
            })
            .or_insert(TripLengthSummary {
                trip_length: trip.trip_length(),
                count: 1,
                credit_min: credit,
                credit_max: credit,
                time_away_min: away,
                time_away_max: away,
            });
    }

    groups.into_values().collect()
}

/// The shortest and longest flights by distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlightExtremes<'a> {
    /// First leg with the smallest non-zero mileage, or `None` if every leg
    /// has zero mileage.
    pub shortest: Option<&'a Leg>,
    /// First leg with the largest mileage.
    pub longest: &'a Leg,
}

/// Find the shortest and longest flights. Returns `None` for no legs.
///
/// Zero-mileage legs never count as the shortest flight.
pub fn flight_extremes<'a>(legs: impl IntoIterator<Item = &'a Leg>) -> Option<FlightExtremes<'a>> {
    let mut legs = legs.into_iter();
    let first = legs.next()?;
    let start = FlightExtremes {
        shortest: (first.mileage > 0).then_some(first),
        longest: first,
    };

    Some(legs.fold(start, |mut acc, leg| {
        if leg.mileage > 0 && acc.shortest.is_none_or(|s| leg.mileage < s.mileage) {
            acc.shortest = Some(leg);
        }
        if leg.mileage > acc.longest.mileage {
            acc.longest = leg;
        }
        acc
    }))
}

/// Leg counts per manufacturer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MakeCounts {
    /// Airbus legs.
    pub airbus: usize,
    /// Boeing legs.
    pub boeing: usize,
    /// Other legs.
    pub other: usize,
}

/// Leg counts per body type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BodyCounts {
    /// Narrowbody legs.
    pub narrow: usize,
    /// Widebody legs.
    pub wide: usize,
}

/// Global totals across all trips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Number of trips.
    pub trips: usize,
    /// Number of legs.
    pub legs: usize,
    /// Distinct dates with at least one leg.
    pub days_flown: usize,
    /// Summed miles.
    pub mileage: u64,
    /// Summed block time, minutes.
    pub duration: u64,
    /// Summed credit value, minutes.
    pub credit_value: u64,
    /// Summed time away from base, minutes.
    pub time_away_from_base: u64,
    /// Legs per make.
    pub by_make: MakeCounts,
    /// Legs per body type.
    pub by_body: BodyCounts,
}

impl Totals {
    /// Compute totals for a set of trips.
    #[must_use]
    pub fn compute(trips: &[Trip]) -> Self {
        let mut totals = Self {
            trips: trips.len(),
            ..Self::default()
        };
        let mut dates = std::collections::HashSet::new();

        for trip in trips {
            totals.credit_value += u64::from(trip.credit_value);
            totals.time_away_from_base += u64::from(trip.time_away_from_base);
        }

        for leg in all_legs(trips) {
            totals.legs += 1;
            dates.insert(leg.date);
            totals.mileage += u64::from(leg.mileage);
            totals.duration += u64::from(leg.duration);

            match leg.aircraft.make {
                AircraftMake::Airbus => totals.by_make.airbus += 1,
                AircraftMake::Boeing => totals.by_make.boeing += 1,
                AircraftMake::Other => totals.by_make.other += 1,
            }
            match leg.aircraft.body {
                BodyType::Narrow => totals.by_body.narrow += 1,
                BodyType::Wide => totals.by_body.wide += 1,
            }
        }

        totals.days_flown = dates.len();
        totals
    }
}

/// Total distance expressed against astronomical yardsticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceMetrics {
    /// Times around the Earth.
    pub globe_laps: f64,
    /// Percent of the way to the Moon.
    pub moon_percent: f64,
}

impl DistanceMetrics {
    /// Derive the metrics from a mileage total.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_miles(miles: u64) -> Self {
        let miles = miles as f64;
        Self {
            globe_laps: miles / GLOBE_MILES,
            moon_percent: miles / MOON_MILES * 100.0,
        }
    }

    /// Laps around the globe, rounded for display.
    #[must_use]
    pub fn globe_laps_text(&self) -> String {
        round_number(self.globe_laps)
    }

    /// Percent of the way to the Moon, rounded for display.
    #[must_use]
    pub fn moon_percent_text(&self) -> String {
        round_number(self.moon_percent)
    }
}

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard<'a> {
    /// Global totals.
    pub totals: Totals,
    /// Per aircraft rows.
    pub aircraft: Vec<AircraftSummary>,
    /// Per trip length rows.
    pub trip_lengths: Vec<TripLengthSummary>,
    /// Shortest and longest flights; `None` when there are no legs.
    pub extremes: Option<FlightExtremes<'a>>,
    /// Distance yardsticks.
    pub distance: DistanceMetrics,
    /// Arrivals per state abbreviation.
    pub state_visits: BTreeMap<String, u32>,
}

impl<'a> Dashboard<'a> {
    /// Compute every aggregation for the given trips.
    #[must_use]
    pub fn build(trips: &'a [Trip], reference: &ReferenceData) -> Self {
        let totals = Totals::compute(trips);
        let distance = DistanceMetrics::from_miles(totals.mileage);

        Self {
            aircraft: by_aircraft(all_legs(trips)),
            trip_lengths: by_trip_length(trips),
            extremes: flight_extremes(all_legs(trips)),
            distance,
            state_visits: state_visits(reference, all_legs(trips)),
            totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::fixtures::{leg, trip};
    use crate::trip::{Aircraft, Rotation};

    fn with_aircraft(mut l: Leg, make: AircraftMake, model: &str, body: BodyType) -> Leg {
        l.aircraft = Aircraft {
            make,
            model: model.to_string(),
            body,
        };
        l
    }

    fn sample_trips() -> Vec<Trip> {
        vec![
            Trip::new(
                1,
                Rotation::parse("R1").unwrap(),
                vec![
                    with_aircraft(
                        leg("2023-01-01", "MSP", "ORD", 334),
                        AircraftMake::Boeing,
                        "737",
                        BodyType::Narrow,
                    ),
                    leg("2023-01-01", "ORD", "MSP", 334),
                ],
                300,
                600,
            ),
            Trip::new(
                2,
                Rotation::parse("R2").unwrap(),
                vec![
                    leg("2023-01-05", "MSP", "SEA", 1399),
                    with_aircraft(
                        leg("2023-01-06", "SEA", "HNL", 2677),
                        AircraftMake::Airbus,
                        "330",
                        BodyType::Wide,
                    ),
                    with_aircraft(
                        leg("2023-01-07", "HNL", "MSP", 3972),
                        AircraftMake::Other,
                        "E175",
                        BodyType::Narrow,
                    ),
                ],
                1500,
                4000,
            ),
            Trip::new(
                3,
                Rotation::parse("R3").unwrap(),
                vec![leg("2023-01-01", "MSP", "FAR", 0)],
                200,
                500,
            ),
        ]
    }

    #[test]
    fn test_by_aircraft_groups_and_sorts() {
        let trips = sample_trips();
        let rows = by_aircraft(all_legs(&trips));

        let keys: Vec<_> = rows
            .iter()
            .map(|r| format!("{}{}", r.make, r.model))
            .collect();
        assert_eq!(keys, vec!["A320", "A330", "B737", "OE175"]);

        let a320 = &rows[0];
        assert_eq!(a320.count, 3);
        assert_eq!(a320.mileage, 334 + 1399);
        assert_eq!(a320.duration, 180);
    }

    #[test]
    fn test_by_aircraft_model_order_is_case_sensitive() {
        let legs = vec![
            with_aircraft(
                leg("2023-01-01", "MSP", "ORD", 1),
                AircraftMake::Other,
                "b",
                BodyType::Narrow,
            ),
            with_aircraft(
                leg("2023-01-01", "MSP", "ORD", 1),
                AircraftMake::Other,
                "B",
                BodyType::Narrow,
            ),
        ];
        let rows = by_aircraft(&legs);
        assert_eq!(rows[0].model, "B");
        assert_eq!(rows[1].model, "b");
    }

    #[test]
    fn test_by_aircraft_count_matches_leg_total() {
        let trips = sample_trips();
        let rows = by_aircraft(all_legs(&trips));
        let counted: usize = rows.iter().map(|r| r.count).sum();
        assert_eq!(counted, Totals::compute(&trips).legs);
    }

    #[test]
    fn test_by_trip_length() {
        let mut trips = sample_trips();
        trips.push(Trip::new(
            4,
            Rotation::parse("R4").unwrap(),
            vec![leg("2023-02-01", "MSP", "DEN", 680)],
            100,
            900,
        ));

        let rows = by_trip_length(&trips);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].trip_length, 1);
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].credit_min, 100);
        assert_eq!(rows[0].credit_max, 300);
        assert_eq!(rows[0].time_away_min, 500);
        assert_eq!(rows[0].time_away_max, 900);

        assert_eq!(rows[1].trip_length, 3);
        assert_eq!(rows[1].count, 1);

        let counted: usize = rows.iter().map(|r| r.count).sum();
        assert_eq!(counted, trips.len());
    }

    #[test]
    fn test_flight_extremes_skip_zero_for_shortest() {
        let legs: Vec<_> = [0, 120, 45, 900]
            .into_iter()
            .map(|m| leg("2023-01-01", "MSP", "ORD", m))
            .collect();

        let extremes = flight_extremes(&legs).unwrap();
        assert_eq!(extremes.shortest.unwrap().mileage, 45);
        assert_eq!(extremes.longest.mileage, 900);
    }

    #[test]
    fn test_flight_extremes_first_wins_ties() {
        let legs = vec![
            leg("2023-01-01", "MSP", "ORD", 300),
            leg("2023-01-02", "ORD", "MSP", 300),
        ];
        let extremes = flight_extremes(&legs).unwrap();
        assert!(std::ptr::eq(extremes.shortest.unwrap(), &legs[0]));
        assert!(std::ptr::eq(extremes.longest, &legs[0]));
    }

    #[test]
    fn test_flight_extremes_all_zero() {
        let legs = vec![
            leg("2023-01-01", "MSP", "ORD", 0),
            leg("2023-01-02", "ORD", "MSP", 0),
        ];
        let extremes = flight_extremes(&legs).unwrap();
        assert!(extremes.shortest.is_none());
        assert_eq!(extremes.longest.mileage, 0);
    }

    #[test]
    fn test_flight_extremes_empty() {
        let legs: Vec<Leg> = Vec::new();
        assert!(flight_extremes(&legs).is_none());
    }

    #[test]
    fn test_totals() {
        let trips = sample_trips();
        let totals = Totals::compute(&trips);

        assert_eq!(totals.trips, 3);
        assert_eq!(totals.legs, 6);
        // 01-01 appears in two trips, counted once.
        assert_eq!(totals.days_flown, 4);
        assert_eq!(totals.mileage, 334 + 334 + 1399 + 2677 + 3972);
        assert_eq!(totals.duration, 6 * 60);
        assert_eq!(totals.credit_value, 2000);
        assert_eq!(totals.time_away_from_base, 5100);
        assert_eq!(
            totals.by_make,
            MakeCounts {
                airbus: 4,
                boeing: 1,
                other: 1
            }
        );
        assert_eq!(totals.by_body, BodyCounts { narrow: 5, wide: 1 });
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(Totals::compute(&[]), Totals::default());
    }

    #[test]
    fn test_distance_metrics() {
        let metrics = DistanceMetrics::from_miles(24_880 * 4);
        assert_eq!(metrics.globe_laps_text(), "4");

        let metrics = DistanceMetrics::from_miles(237_674 / 2);
        assert_eq!(metrics.moon_percent_text(), "50");

        let metrics = DistanceMetrics::from_miles(111_960);
        assert_eq!(metrics.globe_laps_text(), "4.5");
    }

    #[test]
    fn test_dashboard_build() {
        let trips = sample_trips();
        let reference = ReferenceData::builtin().unwrap();
        let dashboard = Dashboard::build(&trips, &reference);

        assert_eq!(dashboard.totals.trips, 3);
        assert_eq!(dashboard.aircraft.len(), 4);
        assert_eq!(dashboard.extremes.unwrap().longest.mileage, 3972);
        assert_eq!(dashboard.state_visits.get("MN"), Some(&2));
        assert_eq!(dashboard.state_visits.get("HI"), Some(&1));

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["totals"]["legs"], 6);
        assert_eq!(json["aircraft"][0]["make"], "A");
    }

    #[test]
    fn test_dashboard_does_not_reorder_input() {
        let trips = sample_trips();
        let before = trips.clone();
        let reference = ReferenceData::default();

        let _ = Dashboard::build(&trips, &reference);
        assert_eq!(trips, before);
    }

    #[test]
    fn test_single_trip_helper() {
        let t = trip(9, vec![leg("2023-03-01", "MSP", "ORD", 334)]);
        assert_eq!(by_trip_length([&t])[0].count, 1);
    }
}
