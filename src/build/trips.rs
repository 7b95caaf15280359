use crate::build::{self, calendar::ServiceCalendar, shapes::Shape, shapes::shape_id};
use crate::plan::{Direction, NetworkPlan};
use std::collections::HashMap;

/// One concrete trip, carrying everything later stages need so nothing
/// ever has to be parsed back out of its ID.
pub struct Trip {
    pub id: String,
    pub route_id: String,
    pub service_id: String,
    pub shape_id: String,
    pub direction: Direction,
    /// Seconds past midnight. Fractional when the headway does not divide
    /// the hour evenly.
    pub start_seconds: f64,
    pub duration_seconds: u32,
}

pub fn route_id(short_name: &str) -> String {
    format!("r{short_name}")
}

/// Whole trips fitting in a window at the given hourly frequency,
/// rounding down.
pub fn trips_per_direction(frequency: u32, window_seconds: u32) -> u32 {
    (frequency as u64 * window_seconds as u64 / 3600) as u32
}

/// Expands every frequency row into trips: one per served direction per
/// headway slot inside the service window.
pub fn expand_trips(
    plan: &NetworkPlan,
    calendar: &ServiceCalendar,
    shapes: &[Shape],
) -> Result<Vec<Trip>, build::Error> {
    let by_id: HashMap<&str, &Shape> = shapes
        .iter()
        .map(|shape| (shape.id.as_str(), shape))
        .collect();
    let mut trips = Vec::new();
    for frequency in &plan.frequencies {
        let window = plan
            .window(&frequency.window_id)
            .ok_or_else(|| build::Error::UnknownWindow(frequency.window_id.to_string()))?;
        let service_id = calendar
            .service_for(&frequency.window_id)
            .ok_or_else(|| build::Error::UnknownWindow(frequency.window_id.to_string()))?;
        let count = trips_per_direction(frequency.frequency, window.duration().as_seconds());
        if count == 0 {
            continue;
        }
        let headway_seconds = 3600.0 / frequency.frequency as f64;
        let route = route_id(&frequency.route_short_name);
        let start_label = window.start.to_hms_string();
        for direction in frequency.directions.directions() {
            let shape_id = shape_id(&frequency.path_id, direction);
            let shape = by_id
                .get(shape_id.as_str())
                .ok_or_else(|| build::Error::UnknownShape(shape_id.clone()))?;
            let duration_seconds =
                (shape.length.as_kilometers() / frequency.speed * 3600.0) as u32;
            for index in 0..count {
                trips.push(Trip {
                    id: format!(
                        "t-{route}-{window_id}-{start_label}-{digit}-{index}",
                        window_id = frequency.window_id,
                        digit = direction.digit(),
                    ),
                    route_id: route.clone(),
                    service_id: service_id.to_owned(),
                    shape_id: shape_id.clone(),
                    direction,
                    start_seconds: window.start.as_seconds() as f64
                        + headway_seconds * index as f64,
                    duration_seconds,
                });
            }
        }
    }
    Ok(trips)
}

#[cfg(test)]
use crate::build::shapes::build_shapes;
#[cfg(test)]
use crate::geometry::GeometryRegistry;
#[cfg(test)]
use crate::plan::{DayPattern, Frequency, Meta, ServiceWindow, TravelDirections};
#[cfg(test)]
use crate::shared::{Coordinate, Time};
#[cfg(test)]
use std::sync::Arc;

#[test]
fn rounds_partial_trips_down() {
    assert_eq!(trips_per_direction(4, 9000), 10);
    assert_eq!(trips_per_direction(3, 3000), 2);
    assert_eq!(trips_per_direction(0, 9000), 0);
    assert_eq!(trips_per_direction(1, 1800), 0);
}

#[cfg(test)]
fn test_plan(direction: u8, frequency: u32) -> NetworkPlan {
    use chrono::NaiveDate;

    NetworkPlan {
        meta: Meta {
            agency_name: "Test Transit".into(),
            agency_url: "https://example.com".into(),
            agency_timezone: "America/Chicago".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            default_speed: 20.0,
        },
        windows: vec![ServiceWindow {
            id: Arc::from("peak"),
            start: Time::from_seconds(6 * 3600),
            end: Time::from_seconds(6 * 3600 + 9000),
            days: DayPattern::new([true, true, true, true, true, false, false]),
        }],
        frequencies: vec![Frequency {
            route_short_name: Arc::from("10"),
            route_long_name: "Main Street".into(),
            route_type: 3,
            window_id: Arc::from("peak"),
            directions: TravelDirections::from_flag(direction).unwrap(),
            frequency,
            speed: 20.0,
            path_id: Arc::from("main"),
        }],
        paths: vec![(
            Arc::from("main"),
            vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.0, -87.98)],
        )],
        stops: None,
    }
}

#[cfg(test)]
fn expand(plan: &NetworkPlan) -> Vec<Trip> {
    let registry = GeometryRegistry::new(plan.paths.clone());
    let shapes = build_shapes(&registry, &plan.frequencies).unwrap();
    let calendar = ServiceCalendar::resolve(&plan.windows);
    expand_trips(plan, &calendar, &shapes).unwrap()
}

#[test]
fn both_directions_each_get_the_full_count() {
    let plan = test_plan(2, 4);
    let trips = expand(&plan);
    assert_eq!(trips.len(), 20);
    let outbound = trips
        .iter()
        .filter(|trip| trip.direction == Direction::Outbound)
        .count();
    assert_eq!(outbound, 10);
}

#[test]
fn trips_depart_one_headway_apart() {
    let plan = test_plan(1, 4);
    let trips = expand(&plan);
    assert_eq!(trips.len(), 10);
    for (index, trip) in trips.iter().enumerate() {
        assert_eq!(trip.start_seconds, 21600.0 + 900.0 * index as f64);
        assert_eq!(trip.shape_id, "main-1");
    }
}

#[test]
fn trip_ids_name_route_window_start_direction_and_slot() {
    let plan = test_plan(1, 4);
    let trips = expand(&plan);
    assert_eq!(trips[0].id, "t-r10-peak-06:00:00-1-0");
    assert_eq!(trips[9].id, "t-r10-peak-06:00:00-1-9");
    assert_eq!(trips[0].route_id, "r10");
    assert_eq!(trips[0].service_id, "srv1111100");
}

#[test]
fn zero_frequency_yields_no_trips() {
    let plan = test_plan(2, 0);
    assert!(expand(&plan).is_empty());
}

#[test]
fn duration_follows_shape_length_and_speed() {
    let plan = test_plan(1, 4);
    let registry = GeometryRegistry::new(plan.paths.clone());
    let shapes = build_shapes(&registry, &plan.frequencies).unwrap();
    let expected = (shapes[0].length.as_kilometers() / 20.0 * 3600.0) as u32;
    let trips = expand(&plan);
    assert_eq!(trips[0].duration_seconds, expected);
    assert!(trips[0].duration_seconds > 0);
}
