use omnibus::build::FeedBuilder;
use omnibus::feed::Feed;
use omnibus::feed::models::{GtfsAgency, GtfsCalendar, GtfsStopTime, GtfsTrip};
use omnibus::plan::NetworkPlan;
use std::collections::HashSet;
use std::fs::File;
use tempfile::TempDir;

const TABLES: [&str; 7] = [
    "agency.txt",
    "calendar.txt",
    "routes.txt",
    "shapes.txt",
    "stops.txt",
    "trips.txt",
    "stop_times.txt",
];

fn mini_feed() -> Feed {
    let dir = format!("{}/tests/plans/mini", env!("CARGO_MANIFEST_DIR"));
    let plan = NetworkPlan::load_dir(dir).unwrap();
    FeedBuilder::new(&plan).build().unwrap()
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Vec<T> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.deserialize().collect::<Result<_, _>>().unwrap()
}

#[test]
fn mini_fixture_totals_test() {
    let feed = mini_feed();
    // Riverfront runs both ways 8 times each, Hilltop one way 24 times.
    assert_eq!(feed.trips.len(), 40);
    assert_eq!(feed.stop_times.len(), 80);
    assert_eq!(feed.stops.len(), 6);
    assert_eq!(feed.routes.len(), 2);
    assert_eq!(feed.calendar.len(), 2);

    let shape_ids: HashSet<&str> = feed
        .shapes
        .iter()
        .map(|point| point.shape_id.as_str())
        .collect();
    // The ghost path is never referenced and gets no shape.
    assert_eq!(shape_ids, HashSet::from(["river-1", "river-0", "hill-1"]));
    assert_eq!(feed.shapes.len(), 8);
    assert_eq!(feed.trips[0].trip_id, "t-r1-weekday_peak-06:00:00-0-0");
}

#[test]
fn write_dir_round_trips_through_csv_test() {
    let feed = mini_feed();
    let dir = TempDir::new().unwrap();
    feed.write_dir(dir.path()).unwrap();

    for table in TABLES {
        assert!(dir.path().join(table).is_file(), "{table} is missing");
    }

    let agencies: Vec<GtfsAgency> = read_rows(&dir.path().join("agency.txt"));
    assert_eq!(agencies.len(), 1);
    assert_eq!(agencies[0].agency_name, "Mini Transit");

    let trips: Vec<GtfsTrip> = read_rows(&dir.path().join("trips.txt"));
    assert_eq!(trips.len(), feed.trips.len());
    assert_eq!(trips[0].trip_id, feed.trips[0].trip_id);
    assert_eq!(trips[0].direction_id, feed.trips[0].direction_id);

    let stop_times: Vec<GtfsStopTime> = read_rows(&dir.path().join("stop_times.txt"));
    assert_eq!(stop_times.len(), feed.stop_times.len());
    assert_eq!(stop_times[0].arrival_time, feed.stop_times[0].arrival_time);
    assert_eq!(
        stop_times[0].shape_dist_traveled,
        feed.stop_times[0].shape_dist_traveled
    );

    let calendar: Vec<GtfsCalendar> = read_rows(&dir.path().join("calendar.txt"));
    assert_eq!(calendar.len(), 2);
    assert_eq!(calendar[0].start_date, feed.calendar[0].start_date);
    assert_eq!(calendar[0].end_date, feed.calendar[0].end_date);
}

#[test]
fn write_zip_contains_all_tables_test() {
    let feed = mini_feed();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.zip");
    feed.write_zip(&path).unwrap();

    let mut archive = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let mut names = Vec::new();
    for i in 0..archive.len() {
        names.push(archive.by_index(i).unwrap().name().to_string());
    }
    let names: HashSet<&str> = names.iter().map(String::as_str).collect();
    assert_eq!(names, HashSet::from(TABLES));

    let entry = archive.by_name("stop_times.txt").unwrap();
    let mut reader = csv::Reader::from_reader(entry);
    let rows: Vec<GtfsStopTime> = reader.deserialize().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), feed.stop_times.len());
}
