use omnibus::build::FeedBuilder;
use omnibus::feed::Feed;
use omnibus::feed::models::GtfsStopTime;
use omnibus::plan::NetworkPlan;
use omnibus::plan::models::{PlanFrequency, PlanMeta, PlanServiceWindow, PlanStop};
use omnibus::shared::{Coordinate, Time};
use std::collections::{HashMap, HashSet};

fn meta_row() -> PlanMeta {
    PlanMeta {
        agency_name: "Test Transit".into(),
        agency_url: "https://example.com".into(),
        agency_timezone: "America/Chicago".into(),
        start_date: "20260101".into(),
        end_date: "20261231".into(),
        default_route_speed: 25.0,
    }
}

fn window_row(id: &str, start: &str, end: &str, days: [u8; 7]) -> PlanServiceWindow {
    PlanServiceWindow {
        service_window_id: id.into(),
        start_time: start.into(),
        end_time: end.into(),
        monday: days[0],
        tuesday: days[1],
        wednesday: days[2],
        thursday: days[3],
        friday: days[4],
        saturday: days[5],
        sunday: days[6],
    }
}

fn frequency_row(
    short_name: &str,
    window: &str,
    direction: u8,
    frequency: u32,
    path: &str,
) -> PlanFrequency {
    PlanFrequency {
        route_short_name: short_name.into(),
        route_long_name: format!("Route {short_name}"),
        route_type: None,
        service_window_id: window.into(),
        direction,
        frequency,
        speed: None,
        shape_id: path.into(),
    }
}

fn stop_row(id: &str, latitude: f64, longitude: f64) -> PlanStop {
    PlanStop {
        stop_id: id.into(),
        stop_name: Some(format!("Stop {id}")),
        stop_lat: Some(latitude),
        stop_lon: Some(longitude),
    }
}

// Roughly one kilometer due east along a Chicago street.
fn east_path() -> (String, Vec<Coordinate>) {
    (
        "main".into(),
        vec![
            Coordinate::new(41.878, -87.63),
            Coordinate::new(41.878, -87.624),
            Coordinate::new(41.878, -87.618),
        ],
    )
}

fn synthetic_plan(direction: u8, frequency: u32) -> NetworkPlan {
    NetworkPlan::from_records(
        vec![meta_row()],
        vec![window_row("am", "06:00:00", "08:00:00", [1, 1, 1, 1, 1, 0, 0])],
        vec![frequency_row("1", "am", direction, frequency, "main")],
        vec![east_path()],
        None,
    )
    .unwrap()
}

fn rows_by_trip(feed: &Feed) -> HashMap<&str, Vec<&GtfsStopTime>> {
    let mut by_trip: HashMap<&str, Vec<&GtfsStopTime>> = HashMap::new();
    for row in &feed.stop_times {
        by_trip.entry(row.trip_id.as_str()).or_default().push(row);
    }
    by_trip
}

fn shape_points(feed: &Feed, id: &str) -> Vec<(f64, f64)> {
    let mut rows: Vec<_> = feed
        .shapes
        .iter()
        .filter(|point| point.shape_id == id)
        .collect();
    rows.sort_by_key(|point| point.shape_pt_sequence);
    rows.iter()
        .map(|point| (point.shape_pt_lon, point.shape_pt_lat))
        .collect()
}

#[test]
fn end_to_end_synthetic_feed_test() {
    // One bidirectional route at 4 vehicles per hour over a 2 hour window.
    let plan = synthetic_plan(2, 4);
    let feed = FeedBuilder::new(&plan).build().unwrap();

    let shape_ids: HashSet<&str> = feed
        .shapes
        .iter()
        .map(|point| point.shape_id.as_str())
        .collect();
    assert_eq!(shape_ids.len(), 2);
    assert_eq!(feed.stops.len(), 4);
    assert_eq!(feed.trips.len(), 16);
    assert_eq!(feed.stop_times.len(), 32);
    assert_eq!(feed.routes.len(), 1);
    assert_eq!(feed.routes[0].route_id, "r1");
    assert_eq!(feed.calendar.len(), 1);
    assert_eq!(feed.calendar[0].service_id, "srv1111100");
    assert_eq!(feed.agency.agency_name, "Test Transit");

    let outbound = feed
        .trips
        .iter()
        .filter(|trip| trip.direction_id == 0)
        .count();
    assert_eq!(outbound, 8);
    assert_eq!(feed.trips[0].trip_id, "t-r1-am-06:00:00-0-0");
    assert_eq!(feed.trips[0].service_id, "srv1111100");
}

#[test]
fn bidirectional_shapes_mirror_each_other_test() {
    let plan = synthetic_plan(2, 4);
    let feed = FeedBuilder::new(&plan).build().unwrap();
    let forward = shape_points(&feed, "main-1");
    let reverse = shape_points(&feed, "main-0");
    assert_eq!(forward.len(), 3);
    let mut mirrored = forward.clone();
    mirrored.reverse();
    assert_eq!(reverse, mirrored);
}

#[test]
fn single_direction_keeps_the_path_as_drawn_test() {
    let plan = synthetic_plan(0, 4);
    let feed = FeedBuilder::new(&plan).build().unwrap();
    let shape_ids: HashSet<&str> = feed
        .shapes
        .iter()
        .map(|point| point.shape_id.as_str())
        .collect();
    assert_eq!(shape_ids, HashSet::from(["main-0"]));
    let (_, path) = east_path();
    let drawn: Vec<(f64, f64)> = path
        .iter()
        .map(|coordinate| (coordinate.longitude, coordinate.latitude))
        .collect();
    assert_eq!(shape_points(&feed, "main-0"), drawn);
    assert_eq!(feed.trips.len(), 8);
    assert!(feed.trips.iter().all(|trip| trip.direction_id == 0));
}

#[test]
fn partial_headway_slots_round_down_test() {
    let plan = NetworkPlan::from_records(
        vec![meta_row()],
        vec![window_row("am", "06:00:00", "08:30:00", [1, 1, 1, 1, 1, 0, 0])],
        vec![frequency_row("1", "am", 1, 4, "main")],
        vec![east_path()],
        None,
    )
    .unwrap();
    let feed = FeedBuilder::new(&plan).build().unwrap();
    // 4 per hour over 2.5 hours is 10 whole trips.
    assert_eq!(feed.trips.len(), 10);
}

#[test]
fn zero_frequency_synthesizes_nothing_test() {
    let plan = synthetic_plan(2, 0);
    let feed = FeedBuilder::new(&plan).build().unwrap();
    assert!(feed.trips.is_empty());
    assert!(feed.stop_times.is_empty());
    assert!(feed.stops.is_empty());
    // The route and its shapes still exist, they just run no service.
    assert_eq!(feed.routes.len(), 1);
    let shape_ids: HashSet<&str> = feed
        .shapes
        .iter()
        .map(|point| point.shape_id.as_str())
        .collect();
    assert_eq!(shape_ids.len(), 2);
}

#[test]
fn calendar_collapses_identical_day_patterns_test() {
    let plan = NetworkPlan::from_records(
        vec![meta_row()],
        vec![
            window_row("am", "06:00:00", "08:00:00", [1, 1, 1, 1, 1, 0, 0]),
            window_row("pm", "16:00:00", "18:00:00", [1, 1, 1, 1, 1, 0, 0]),
            window_row("wknd", "10:00:00", "16:00:00", [0, 0, 0, 0, 0, 1, 1]),
        ],
        vec![
            frequency_row("1", "am", 1, 4, "main"),
            frequency_row("1", "pm", 1, 4, "main"),
            frequency_row("9", "wknd", 1, 2, "main"),
        ],
        vec![east_path()],
        None,
    )
    .unwrap();
    let feed = FeedBuilder::new(&plan).build().unwrap();

    // Three windows but only two distinct day patterns.
    assert_eq!(feed.calendar.len(), 2);
    let weekday = feed
        .calendar
        .iter()
        .find(|row| row.service_id == "srv1111100")
        .unwrap();
    assert_eq!(weekday.monday, 1);
    assert_eq!(weekday.saturday, 0);
    assert_eq!(
        weekday.start_date,
        chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    );

    // Both weekday windows run under the shared service.
    let am = feed
        .trips
        .iter()
        .find(|trip| trip.trip_id.contains("-am-"))
        .unwrap();
    let pm = feed
        .trips
        .iter()
        .find(|trip| trip.trip_id.contains("-pm-"))
        .unwrap();
    assert_eq!(am.service_id, pm.service_id);

    // One routes row per short name even across windows.
    assert_eq!(feed.routes.len(), 2);
}

fn explicit_plan() -> NetworkPlan {
    // Three curb stops on the south side, one on the north side and one
    // two kilometers off the corridor.
    NetworkPlan::from_records(
        vec![meta_row()],
        vec![window_row("am", "06:00:00", "08:00:00", [1, 1, 1, 1, 1, 0, 0])],
        vec![frequency_row("1", "am", 2, 2, "main")],
        vec![east_path()],
        Some(vec![
            stop_row("s1", 41.8775, -87.629),
            stop_row("s2", 41.8775, -87.624),
            stop_row("s3", 41.8775, -87.6185),
            stop_row("n1", 41.8785, -87.624),
            stop_row("far", 41.9, -87.624),
        ]),
    )
    .unwrap()
}

#[test]
fn registered_stops_follow_the_direction_of_travel_test() {
    let feed = FeedBuilder::new(&explicit_plan()).build().unwrap();
    assert_eq!(feed.trips.len(), 8);

    let by_trip = rows_by_trip(&feed);
    for trip in &feed.trips {
        let rows = &by_trip[trip.trip_id.as_str()];
        let ids: Vec<&str> = rows.iter().map(|row| row.stop_id.as_str()).collect();
        if trip.direction_id == 1 {
            // Eastbound with right-hand traffic boards on the south curb.
            assert_eq!(ids, ["s1", "s2", "s3"]);
        } else {
            assert_eq!(ids, ["n1"]);
        }
    }
    assert_eq!(feed.stop_times.len(), 4 * 3 + 4);
}

#[test]
fn unvisited_stops_are_pruned_test() {
    let feed = FeedBuilder::new(&explicit_plan()).build().unwrap();
    let ids: HashSet<&str> = feed.stops.iter().map(|stop| stop.stop_id.as_str()).collect();
    assert_eq!(ids, HashSet::from(["s1", "s2", "s3", "n1"]));
}

#[test]
fn stop_times_walk_forward_test() {
    let feed = FeedBuilder::new(&explicit_plan()).build().unwrap();
    let by_trip = rows_by_trip(&feed);
    assert_eq!(by_trip.len(), feed.trips.len());
    for rows in by_trip.values() {
        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row.stop_sequence, index as u32);
            assert_eq!(row.arrival_time, row.departure_time);
            if index > 0 {
                assert!(row.shape_dist_traveled >= rows[index - 1].shape_dist_traveled);
                assert!(row.arrival_time >= rows[index - 1].departure_time);
            }
        }
    }
}

#[test]
fn synthetic_rows_land_on_the_endpoints_test() {
    let plan = synthetic_plan(2, 4);
    let feed = FeedBuilder::new(&plan).build().unwrap();
    let by_trip = rows_by_trip(&feed);
    for trip in &feed.trips {
        let rows = &by_trip[trip.trip_id.as_str()];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stop_id, format!("stp-{}-0", trip.shape_id));
        assert_eq!(rows[1].stop_id, format!("stp-{}-1", trip.shape_id));
        assert_eq!(rows[0].shape_dist_traveled, 0.0);
        // The last row sits at the full shape length, about a kilometer.
        assert!(rows[1].shape_dist_traveled > 0.9);
        assert!(rows[1].shape_dist_traveled < 1.1);
        assert!(rows[1].arrival_time > rows[0].arrival_time);
    }

    // First outbound trip departs at the window start.
    let first = feed
        .trips
        .iter()
        .find(|trip| trip.trip_id == "t-r1-am-06:00:00-0-0")
        .unwrap();
    let rows = &by_trip[first.trip_id.as_str()];
    assert_eq!(rows[0].arrival_time, Time::from_seconds(6 * 3600));
}

#[test]
fn departures_spread_one_headway_apart_test() {
    let plan = synthetic_plan(1, 4);
    let feed = FeedBuilder::new(&plan).build().unwrap();
    let by_trip = rows_by_trip(&feed);
    let mut departures: Vec<u32> = feed
        .trips
        .iter()
        .map(|trip| by_trip[trip.trip_id.as_str()][0].departure_time.as_seconds())
        .collect();
    departures.sort_unstable();
    assert_eq!(departures.len(), 8);
    for (index, departure) in departures.iter().enumerate() {
        assert_eq!(*departure, 6 * 3600 + 900 * index as u32);
    }
}
