use crate::build::shapes::Shape;
use crate::build::stops::{StopPlacement, synthetic_stop_ids};
use crate::build::trips::Trip;
use crate::feed::models::GtfsStopTime;
use crate::shared::{Duration, Time};
use geo::LineLocatePoint;
use rayon::prelude::*;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use tracing::warn;

/// Any measured distance this far past the end of a shape discredits the
/// whole measurement set.
const DISTANCE_SLACK_KM: f64 = 100.0;

/// Ordered stops and their along-shape distances in km, shared by every
/// trip on the shape.
struct ShapeProfile {
    stops: Vec<(Arc<str>, f64)>,
}

/// Builds `stop_times.txt` rows for every trip. Times run linearly in
/// distance between the trip's start and end, truncated to whole seconds.
pub fn build_stop_times(
    trips: &[Trip],
    shapes: &[Shape],
    placement: &StopPlacement,
) -> Vec<GtfsStopTime> {
    if placement.synthetic {
        return endpoint_rows(trips, shapes);
    }
    let profiles: HashMap<&str, ShapeProfile> = shapes
        .par_iter()
        .map(|shape| (shape.id.as_str(), profile_shape(shape, placement)))
        .collect();
    trips
        .par_iter()
        .map(|trip| interpolated_rows(trip, &profiles))
        .collect::<Vec<_>>()
        .concat()
}

/// Measures each candidate stop along the shape and orders the stops by
/// that distance, breaking ties by stop ID.
fn profile_shape(shape: &Shape, placement: &StopPlacement) -> ShapeProfile {
    let length_km = shape.length.as_kilometers();
    let mut measured: Vec<(Arc<str>, f64)> = placement
        .by_shape
        .get(shape.id.as_str())
        .map(|candidates| {
            candidates
                .iter()
                .map(|stop| {
                    let fraction = shape.planar.line_locate_point(&stop.point).unwrap_or(0.0);
                    (stop.id.clone(), fraction * length_km)
                })
                .collect()
        })
        .unwrap_or_default();
    measured.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    let raw: Vec<f64> = measured.iter().map(|(_, distance)| *distance).collect();
    if raw.len() >= 2
        && raw
            .iter()
            .any(|&distance| distance >= length_km + DISTANCE_SLACK_KM)
    {
        warn!(
            "Implausible stop distances on shape {}, spacing stops evenly",
            shape.id
        );
    }
    let distances = plausible_distances(raw, length_km);
    let stops = measured
        .into_iter()
        .zip(distances)
        .map(|((id, _), distance)| (id, distance))
        .collect();
    ShapeProfile { stops }
}

/// The measured distances, unless one lands implausibly far past the end
/// of the shape. Then the stops are assumed evenly spaced instead.
fn plausible_distances(measured: Vec<f64>, length_km: f64) -> Vec<f64> {
    let reasonable = measured
        .iter()
        .all(|&distance| distance < length_km + DISTANCE_SLACK_KM);
    if reasonable || measured.len() < 2 {
        return measured;
    }
    let delta = length_km / (measured.len() - 1) as f64;
    (0..measured.len()).map(|i| i as f64 * delta).collect()
}

fn interpolated_rows(trip: &Trip, profiles: &HashMap<&str, ShapeProfile>) -> Vec<GtfsStopTime> {
    let Some(profile) = profiles.get(trip.shape_id.as_str()) else {
        return Vec::new();
    };
    let Some((first, last)) = profile.stops.first().zip(profile.stops.last()) else {
        return Vec::new();
    };
    let t0 = trip.start_seconds;
    let t1 = t0 + trip.duration_seconds as f64;
    let d0 = first.1;
    let span = last.1 - d0;
    profile
        .stops
        .iter()
        .enumerate()
        .map(|(sequence, (stop_id, distance))| {
            let time = if span > 0.0 {
                t0 + (t1 - t0) * (distance - d0) / span
            } else {
                t0
            };
            let clock = Time::truncate(time);
            GtfsStopTime {
                trip_id: trip.id.clone(),
                stop_id: stop_id.to_string(),
                stop_sequence: sequence as u32,
                arrival_time: clock,
                departure_time: clock,
                shape_dist_traveled: *distance,
            }
        })
        .collect()
}

/// Two rows per trip, one at each end of its shape.
fn endpoint_rows(trips: &[Trip], shapes: &[Shape]) -> Vec<GtfsStopTime> {
    let length_by_shape: HashMap<&str, f64> = shapes
        .iter()
        .map(|shape| (shape.id.as_str(), shape.length.as_kilometers()))
        .collect();
    trips
        .par_iter()
        .map(|trip| {
            let Some(&length_km) = length_by_shape.get(trip.shape_id.as_str()) else {
                return Vec::new();
            };
            let [origin, terminus] = synthetic_stop_ids(&trip.shape_id);
            let start = Time::truncate(trip.start_seconds);
            let end = start + Duration::from_seconds(trip.duration_seconds);
            vec![
                GtfsStopTime {
                    trip_id: trip.id.clone(),
                    stop_id: origin,
                    stop_sequence: 0,
                    arrival_time: start,
                    departure_time: start,
                    shape_dist_traveled: 0.0,
                },
                GtfsStopTime {
                    trip_id: trip.id.clone(),
                    stop_id: terminus,
                    stop_sequence: 1,
                    arrival_time: end,
                    departure_time: end,
                    shape_dist_traveled: length_km,
                },
            ]
        })
        .collect::<Vec<_>>()
        .concat()
}

#[cfg(test)]
use crate::plan::Direction;

#[cfg(test)]
fn test_trip(shape_id: &str) -> Trip {
    Trip {
        id: "t-r10-peak-06:00:00-1-0".into(),
        route_id: "r10".into(),
        service_id: "srv1111100".into(),
        shape_id: shape_id.into(),
        direction: Direction::Inbound,
        start_seconds: 21600.0,
        duration_seconds: 1000,
    }
}

#[cfg(test)]
fn profile_of(distances: &[f64]) -> ShapeProfile {
    ShapeProfile {
        stops: distances
            .iter()
            .enumerate()
            .map(|(i, &distance)| (Arc::from(format!("s{i}").as_str()), distance))
            .collect(),
    }
}

#[test]
fn implausible_measurements_fall_back_to_even_spacing() {
    assert_eq!(
        plausible_distances(vec![0.0, 5.0, 250.0], 10.0),
        vec![0.0, 5.0, 10.0]
    );
}

#[test]
fn plausible_measurements_pass_through() {
    assert_eq!(
        plausible_distances(vec![0.0, 4.0, 9.5], 10.0),
        vec![0.0, 4.0, 9.5]
    );
    assert_eq!(plausible_distances(vec![500.0], 10.0), vec![500.0]);
}

#[test]
fn times_run_linearly_in_distance() {
    let mut profiles = HashMap::new();
    profiles.insert("main-1", profile_of(&[0.0, 2.5, 5.0]));
    let rows = interpolated_rows(&test_trip("main-1"), &profiles);
    assert_eq!(rows.len(), 3);
    let times: Vec<u32> = rows.iter().map(|row| row.arrival_time.as_seconds()).collect();
    assert_eq!(times, [21600, 22100, 22600]);
    let sequences: Vec<u32> = rows.iter().map(|row| row.stop_sequence).collect();
    assert_eq!(sequences, [0, 1, 2]);
}

#[test]
fn uneven_spacing_truncates_to_whole_seconds() {
    let mut profiles = HashMap::new();
    profiles.insert("main-1", profile_of(&[0.0, 1.0, 3.0]));
    let rows = interpolated_rows(&test_trip("main-1"), &profiles);
    // 21600 + 1000/3 truncates rather than rounds.
    assert_eq!(rows[1].arrival_time.as_seconds(), 21933);
    assert_eq!(rows[2].arrival_time.as_seconds(), 22600);
}

#[test]
fn single_stop_sits_at_the_start_time() {
    let mut profiles = HashMap::new();
    profiles.insert("main-1", profile_of(&[1.5]));
    let rows = interpolated_rows(&test_trip("main-1"), &profiles);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].arrival_time.as_seconds(), 21600);
    assert_eq!(rows[0].shape_dist_traveled, 1.5);
}

#[test]
fn zero_span_puts_everything_at_the_start() {
    let mut profiles = HashMap::new();
    profiles.insert("main-1", profile_of(&[2.0, 2.0]));
    let rows = interpolated_rows(&test_trip("main-1"), &profiles);
    assert_eq!(rows[0].arrival_time.as_seconds(), 21600);
    assert_eq!(rows[1].arrival_time.as_seconds(), 21600);
}

#[test]
fn shapes_without_candidates_produce_no_rows() {
    let profiles = HashMap::new();
    assert!(interpolated_rows(&test_trip("main-1"), &profiles).is_empty());
}

#[test]
fn endpoint_trips_get_exactly_two_rows() {
    use crate::build::shapes::build_shapes;
    use crate::geometry::GeometryRegistry;
    use crate::plan::{Frequency, TravelDirections};
    use crate::shared::Coordinate;

    let registry = GeometryRegistry::new(vec![(
        Arc::from("main"),
        vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.0, -87.98)],
    )]);
    let frequency = Frequency {
        route_short_name: Arc::from("10"),
        route_long_name: "Main Street".into(),
        route_type: 3,
        window_id: Arc::from("peak"),
        directions: TravelDirections::Single(Direction::Inbound),
        frequency: 4,
        speed: 20.0,
        path_id: Arc::from("main"),
    };
    let shapes = build_shapes(&registry, &[frequency]).unwrap();
    let rows = endpoint_rows(&[test_trip("main-1")], &shapes);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].stop_id, "stp-main-1-0");
    assert_eq!(rows[1].stop_id, "stp-main-1-1");
    assert_eq!(rows[0].arrival_time.as_seconds(), 21600);
    assert_eq!(rows[1].arrival_time.as_seconds(), 22600);
    assert_eq!(rows[0].shape_dist_traveled, 0.0);
    assert_eq!(rows[1].shape_dist_traveled, shapes[0].length.as_kilometers());
}
