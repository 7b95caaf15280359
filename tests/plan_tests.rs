use omnibus::plan::{self, Config, NetworkPlan, TravelDirections};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn mini_plan_dir() -> String {
    format!("{}/tests/plans/mini", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn load_mini_plan_test() {
    let plan = NetworkPlan::load_dir(mini_plan_dir()).unwrap();

    assert_eq!(plan.meta.agency_name, "Mini Transit");
    assert_eq!(plan.meta.agency_timezone, "America/Chicago");
    assert_eq!(
        plan.meta.start_date,
        chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    );
    assert_eq!(plan.meta.default_speed, 25.0);

    assert_eq!(plan.windows.len(), 2);
    let peak = plan.window("weekday_peak").unwrap();
    assert_eq!(peak.start.as_seconds(), 6 * 3600);
    assert_eq!(peak.duration().as_seconds(), 2 * 3600);
    assert_eq!(peak.days.service_id(), "srv1111100");
    let weekend = plan.window("weekend_all").unwrap();
    assert_eq!(weekend.days.service_id(), "srv0000011");

    assert_eq!(plan.frequencies.len(), 2);
    let riverfront = &plan.frequencies[0];
    assert_eq!(riverfront.route_short_name.as_ref(), "1");
    assert_eq!(riverfront.directions, TravelDirections::Both);
    assert_eq!(riverfront.frequency, 4);
    // Blank speed falls back to the network default.
    assert_eq!(riverfront.speed, 25.0);
    assert_eq!(riverfront.route_type, 3);
    let hilltop = &plan.frequencies[1];
    assert_eq!(hilltop.speed, 30.0);
    // Blank route_type falls back to bus.
    assert_eq!(hilltop.route_type, 3);
    assert_eq!(hilltop.path_id.as_ref(), "hill");

    assert_eq!(plan.paths.len(), 3);
    assert_eq!(plan.paths[0].0.as_ref(), "river");
    assert_eq!(plan.paths[0].1.len(), 3);
    assert_eq!(plan.paths[0].1[0].longitude, -87.63);
    assert_eq!(plan.paths[0].1[0].latitude, 41.878);

    assert!(plan.stops.is_none());
}

const META: &str = "agency_name,agency_url,agency_timezone,start_date,end_date,default_route_speed\n\
    Demo,https://demo.example,Europe/Berlin,20260101,20260630,20\n";
const WINDOWS: &str = "service_window_id,start_time,end_time,monday,tuesday,wednesday,thursday,friday,saturday,sunday\n\
    base,07:00:00,19:00:00,1,1,1,1,1,1,1\n";
const FREQUENCIES: &str = "route_short_name,route_long_name,route_type,service_window_id,direction,frequency,speed,shape_id\n\
    A,Airport,3,base,2,6,,loop\n";
const GEOMETRY: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"shape_id":"loop"},"geometry":{"type":"LineString","coordinates":[[13.38,52.51],[13.4,52.52]]}}]}"#;

fn write_plan(dir: &Path) {
    fs::write(dir.join("meta.csv"), META).unwrap();
    fs::write(dir.join("service_windows.csv"), WINDOWS).unwrap();
    fs::write(dir.join("frequencies.csv"), FREQUENCIES).unwrap();
    fs::write(dir.join("shapes.geojson"), GEOMETRY).unwrap();
}

#[test]
fn missing_file_is_reported_with_its_path_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    fs::remove_file(dir.path().join("frequencies.csv")).unwrap();
    match NetworkPlan::load_dir(dir.path()) {
        Err(plan::Error::Csv { file, .. }) => assert!(file.ends_with("frequencies.csv")),
        other => panic!("expected a csv error, got {other:?}"),
    }
}

#[test]
fn unknown_window_reference_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let rows = FREQUENCIES.replace(",base,", ",ghost_window,");
    fs::write(dir.path().join("frequencies.csv"), rows).unwrap();
    match NetworkPlan::load_dir(dir.path()) {
        Err(plan::Error::UnknownServiceWindow { route, window }) => {
            assert_eq!(route, "A");
            assert_eq!(window, "ghost_window");
        }
        other => panic!("expected an unknown window error, got {other:?}"),
    }
}

#[test]
fn unknown_path_reference_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let rows = FREQUENCIES.replace(",loop\n", ",elsewhere\n");
    fs::write(dir.path().join("frequencies.csv"), rows).unwrap();
    assert!(matches!(
        NetworkPlan::load_dir(dir.path()),
        Err(plan::Error::UnknownPath { .. })
    ));
}

#[test]
fn malformed_date_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let rows = META.replace("20260101", "2026-01-01");
    fs::write(dir.path().join("meta.csv"), rows).unwrap();
    match NetworkPlan::load_dir(dir.path()) {
        Err(plan::Error::InvalidDate(value)) => assert_eq!(value, "2026-01-01"),
        other => panic!("expected an invalid date error, got {other:?}"),
    }
}

#[test]
fn backwards_window_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let rows = WINDOWS.replace("07:00:00,19:00:00", "19:00:00,07:00:00");
    fs::write(dir.path().join("service_windows.csv"), rows).unwrap();
    assert!(matches!(
        NetworkPlan::load_dir(dir.path()),
        Err(plan::Error::EmptyWindow(_))
    ));
}

#[test]
fn unexpected_frequency_column_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let rows = FREQUENCIES
        .replace(",shape_id\n", ",shape_id,color\n")
        .replace(",loop\n", ",loop,red\n");
    fs::write(dir.path().join("frequencies.csv"), rows).unwrap();
    assert!(matches!(
        NetworkPlan::load_dir(dir.path()),
        Err(plan::Error::Csv { .. })
    ));
}

#[test]
fn non_linestring_geometry_is_rejected_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    let geometry = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"shape_id":"blob"},"geometry":{"type":"Point","coordinates":[13.38,52.51]}}]}"#;
    fs::write(dir.path().join("shapes.geojson"), geometry).unwrap();
    match NetworkPlan::load_dir(dir.path()) {
        Err(plan::Error::UnsupportedGeometry(name)) => assert_eq!(name, "blob"),
        other => panic!("expected an unsupported geometry error, got {other:?}"),
    }
}

#[test]
fn stop_registry_is_optional_but_normalized_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    // Extra columns are tolerated, rows without coordinates are dropped
    // and exact duplicates collapse onto the first id.
    let stops = "stop_id,stop_name,stop_lat,stop_lon,location_type\n\
        a,Alpha,52.51,13.385,0\n\
        b,,52.515,13.39,0\n\
        nocoord,Nowhere,,,0\n\
        dup,Alpha again,52.51,13.385,0\n";
    fs::write(dir.path().join("stops.csv"), stops).unwrap();

    let plan = NetworkPlan::load_dir(dir.path()).unwrap();
    let sites = plan.stops.as_ref().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].id.as_ref(), "a");
    assert_eq!(sites[0].name.as_deref(), Some("Alpha"));
    assert_eq!(sites[1].id.as_ref(), "b");
    assert!(sites[1].name.is_none());
}

#[test]
fn file_names_are_configurable_test() {
    let dir = TempDir::new().unwrap();
    write_plan(dir.path());
    fs::rename(
        dir.path().join("shapes.geojson"),
        dir.path().join("network.geojson"),
    )
    .unwrap();
    let config = Config {
        geometry_file_name: "network.geojson".into(),
        ..Default::default()
    };
    let plan = NetworkPlan::load_dir_with(dir.path(), config).unwrap();
    assert_eq!(plan.paths.len(), 1);
    assert_eq!(plan.paths[0].0.as_ref(), "loop");
}
