use crate::shared::{Coordinate, Duration, Time};
use chrono::NaiveDate;
use std::{
    collections::HashSet,
    io,
    path::Path,
    sync::Arc,
    time::Instant,
};
use thiserror::Error;
use tracing::debug;

mod config;
mod loader;
pub mod models;

pub use config::*;
pub use loader::*;
use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("GeoJSON error in {file}: {source}")]
    Geojson {
        file: String,
        #[source]
        source: geojson::Error,
    },
    #[error("Geometry feature {0} has no shape_id property")]
    MissingPathName(usize),
    #[error("Path {0} is not a LineString")]
    UnsupportedGeometry(String),
    #[error("Path {0} needs at least two points")]
    DegeneratePath(String),
    #[error("Expected exactly one meta row, found {0}")]
    MetaRows(usize),
    #[error("Invalid date {0}, expected YYYYMMDD")]
    InvalidDate(String),
    #[error("Invalid time {0}, expected HH:MM:SS")]
    InvalidTime(String),
    #[error("Duplicate service window {0}")]
    DuplicateWindow(String),
    #[error("Service window {0} ends at or before its start")]
    EmptyWindow(String),
    #[error("Service window {window} has {day} flag {value}, expected 0 or 1")]
    InvalidDayFlag {
        window: String,
        day: &'static str,
        value: u8,
    },
    #[error("Route {route} references unknown service window {window}")]
    UnknownServiceWindow { route: String, window: String },
    #[error("Route {route} references unknown path {path}")]
    UnknownPath { route: String, path: String },
    #[error("Route {route} has direction {value}, expected 0, 1 or 2")]
    InvalidDirection { route: String, value: u8 },
    #[error("Route {0} has a non-positive speed")]
    InvalidSpeed(String),
    #[error("Default route speed must be positive, found {0}")]
    InvalidDefaultSpeed(f64),
}

impl Error {
    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            file: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn geojson(path: &Path, source: geojson::Error) -> Self {
        Self::Geojson {
            file: path.display().to_string(),
            source,
        }
    }
}

/// A single direction of travel along a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub const fn digit(&self) -> u8 {
        match self {
            Self::Outbound => 0,
            Self::Inbound => 1,
        }
    }
}

/// The directions a route serves along its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelDirections {
    Single(Direction),
    Both,
}

impl TravelDirections {
    pub const fn from_flag(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Single(Direction::Outbound)),
            1 => Some(Self::Single(Direction::Inbound)),
            2 => Some(Self::Both),
            _ => None,
        }
    }

    /// Combines travel over a shared path. Mixed single directions widen
    /// to both.
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) if a == b => self,
            _ => Self::Both,
        }
    }

    pub fn directions(&self) -> Vec<Direction> {
        match self {
            Self::Single(direction) => vec![*direction],
            Self::Both => vec![Direction::Outbound, Direction::Inbound],
        }
    }
}

/// Active weekdays, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayPattern([bool; 7]);

impl DayPattern {
    pub const fn new(days: [bool; 7]) -> Self {
        Self(days)
    }

    pub const fn days(&self) -> [bool; 7] {
        self.0
    }

    /// Service ID shared by every window active on the same days.
    pub fn service_id(&self) -> String {
        let bits: String = self
            .0
            .iter()
            .map(|&active| if active { '1' } else { '0' })
            .collect();
        format!("srv{bits}")
    }
}

#[derive(Debug, Clone)]
pub struct ServiceWindow {
    pub id: Arc<str>,
    pub start: Time,
    pub end: Time,
    pub days: DayPattern,
}

impl ServiceWindow {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[derive(Debug, Clone)]
pub struct Frequency {
    pub route_short_name: Arc<str>,
    pub route_long_name: String,
    pub route_type: u16,
    pub window_id: Arc<str>,
    pub directions: TravelDirections,
    /// Vehicles per hour per direction.
    pub frequency: u32,
    /// Km/h, positive.
    pub speed: f64,
    pub path_id: Arc<str>,
}

#[derive(Debug, Clone)]
pub struct Meta {
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub default_speed: f64,
}

/// An explicit stop from the optional registry.
#[derive(Debug, Clone)]
pub struct StopSite {
    pub id: Arc<str>,
    pub name: Option<String>,
    pub coordinate: Coordinate,
}

/// A normalized network plan. All cross references are resolved, times and
/// dates are parsed, and per-row defaults are filled in.
#[derive(Debug, Clone)]
pub struct NetworkPlan {
    pub meta: Meta,
    pub windows: Vec<ServiceWindow>,
    pub frequencies: Vec<Frequency>,
    pub paths: Vec<(Arc<str>, Vec<Coordinate>)>,
    pub stops: Option<Vec<StopSite>>,
}

impl NetworkPlan {
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        Self::load_dir_with(dir, Config::default())
    }

    pub fn load_dir_with<P: AsRef<Path>>(dir: P, config: Config) -> Result<Self, Error> {
        debug!("Loading plan...");
        let now = Instant::now();
        let loader = PlanLoader::new(config).load_from_dir(dir)?;
        let plan = Self::from_records(
            loader.meta,
            loader.service_windows,
            loader.frequencies,
            loader.paths,
            loader.stops,
        )?;
        debug!("Loading plan took {:?}", now.elapsed());
        Ok(plan)
    }

    /// Normalizes raw rows into a plan, rejecting rows that no later stage
    /// could interpret.
    pub fn from_records(
        meta: Vec<PlanMeta>,
        service_windows: Vec<PlanServiceWindow>,
        frequencies: Vec<PlanFrequency>,
        paths: Vec<(String, Vec<Coordinate>)>,
        stops: Option<Vec<PlanStop>>,
    ) -> Result<Self, Error> {
        let meta = normalize_meta(meta)?;
        let windows = normalize_windows(service_windows)?;
        let paths: Vec<(Arc<str>, Vec<Coordinate>)> = paths
            .into_iter()
            .map(|(name, points)| (Arc::from(name.as_str()), points))
            .collect();
        let frequencies = normalize_frequencies(frequencies, &meta, &windows, &paths)?;
        let stops = stops.map(normalize_stops);
        Ok(Self {
            meta,
            windows,
            frequencies,
            paths,
            stops,
        })
    }

    pub fn window(&self, id: &str) -> Option<&ServiceWindow> {
        self.windows.iter().find(|window| window.id.as_ref() == id)
    }
}

fn normalize_meta(mut rows: Vec<PlanMeta>) -> Result<Meta, Error> {
    if rows.len() != 1 {
        return Err(Error::MetaRows(rows.len()));
    }
    let row = rows.remove(0);
    if row.default_route_speed <= 0.0 {
        return Err(Error::InvalidDefaultSpeed(row.default_route_speed));
    }
    Ok(Meta {
        agency_name: row.agency_name,
        agency_url: row.agency_url,
        agency_timezone: row.agency_timezone,
        start_date: parse_date(&row.start_date)?,
        end_date: parse_date(&row.end_date)?,
        default_speed: row.default_route_speed,
    })
}

fn normalize_windows(rows: Vec<PlanServiceWindow>) -> Result<Vec<ServiceWindow>, Error> {
    let mut windows: Vec<ServiceWindow> = Vec::with_capacity(rows.len());
    for row in rows {
        if windows
            .iter()
            .any(|window| window.id.as_ref() == row.service_window_id)
        {
            return Err(Error::DuplicateWindow(row.service_window_id));
        }
        let start = parse_time(&row.start_time)?;
        let end = parse_time(&row.end_time)?;
        if end.as_seconds() <= start.as_seconds() {
            return Err(Error::EmptyWindow(row.service_window_id));
        }
        let flags = [
            ("monday", row.monday),
            ("tuesday", row.tuesday),
            ("wednesday", row.wednesday),
            ("thursday", row.thursday),
            ("friday", row.friday),
            ("saturday", row.saturday),
            ("sunday", row.sunday),
        ];
        let mut active = [false; 7];
        for (slot, (day, value)) in active.iter_mut().zip(flags) {
            *slot = match value {
                0 => false,
                1 => true,
                _ => {
                    return Err(Error::InvalidDayFlag {
                        window: row.service_window_id,
                        day,
                        value,
                    });
                }
            };
        }
        windows.push(ServiceWindow {
            id: Arc::from(row.service_window_id.as_str()),
            start,
            end,
            days: DayPattern::new(active),
        });
    }
    Ok(windows)
}

fn normalize_frequencies(
    rows: Vec<PlanFrequency>,
    meta: &Meta,
    windows: &[ServiceWindow],
    paths: &[(Arc<str>, Vec<Coordinate>)],
) -> Result<Vec<Frequency>, Error> {
    let mut frequencies = Vec::with_capacity(rows.len());
    for row in rows {
        let window_id = windows
            .iter()
            .find(|window| window.id.as_ref() == row.service_window_id)
            .map(|window| window.id.clone())
            .ok_or_else(|| Error::UnknownServiceWindow {
                route: row.route_short_name.clone(),
                window: row.service_window_id.clone(),
            })?;
        let path_id = paths
            .iter()
            .find(|(name, _)| name.as_ref() == row.shape_id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| Error::UnknownPath {
                route: row.route_short_name.clone(),
                path: row.shape_id.clone(),
            })?;
        let directions =
            TravelDirections::from_flag(row.direction).ok_or_else(|| Error::InvalidDirection {
                route: row.route_short_name.clone(),
                value: row.direction,
            })?;
        let speed = row.speed.unwrap_or(meta.default_speed);
        if speed <= 0.0 {
            return Err(Error::InvalidSpeed(row.route_short_name));
        }
        frequencies.push(Frequency {
            route_short_name: Arc::from(row.route_short_name.as_str()),
            route_long_name: row.route_long_name,
            route_type: row.route_type.unwrap_or(3),
            window_id,
            directions,
            frequency: row.frequency,
            speed,
            path_id,
        });
    }
    Ok(frequencies)
}

fn normalize_stops(rows: Vec<PlanStop>) -> Vec<StopSite> {
    let mut seen = HashSet::new();
    let mut sites = Vec::new();
    for row in rows {
        let (Some(latitude), Some(longitude)) = (row.stop_lat, row.stop_lon) else {
            continue;
        };
        // The first of several rows sharing an exact coordinate pair wins.
        if !seen.insert((longitude.to_bits(), latitude.to_bits())) {
            continue;
        }
        sites.push(StopSite {
            id: Arc::from(row.stop_id.as_str()),
            name: row.stop_name,
            coordinate: Coordinate::new(latitude, longitude),
        });
    }
    sites
}

fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| Error::InvalidDate(value.to_owned()))
}

fn parse_time(value: &str) -> Result<Time, Error> {
    Time::from_hms(value).ok_or_else(|| Error::InvalidTime(value.to_owned()))
}

#[cfg(test)]
fn sample_meta() -> PlanMeta {
    PlanMeta {
        agency_name: "Test Transit".into(),
        agency_url: "https://example.com".into(),
        agency_timezone: "America/Chicago".into(),
        start_date: "20260101".into(),
        end_date: "20261231".into(),
        default_route_speed: 20.0,
    }
}

#[cfg(test)]
fn sample_window() -> PlanServiceWindow {
    PlanServiceWindow {
        service_window_id: "weekday_peak".into(),
        start_time: "06:00:00".into(),
        end_time: "09:00:00".into(),
        monday: 1,
        tuesday: 1,
        wednesday: 1,
        thursday: 1,
        friday: 1,
        saturday: 0,
        sunday: 0,
    }
}

#[cfg(test)]
fn sample_frequency() -> PlanFrequency {
    PlanFrequency {
        route_short_name: "10".into(),
        route_long_name: "Main Street".into(),
        route_type: None,
        service_window_id: "weekday_peak".into(),
        direction: 2,
        frequency: 4,
        speed: None,
        shape_id: "main".into(),
    }
}

#[cfg(test)]
fn sample_paths() -> Vec<(String, Vec<Coordinate>)> {
    vec![(
        "main".into(),
        vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.0, -87.9)],
    )]
}

#[test]
fn service_id_covers_active_days() {
    let weekdays = DayPattern::new([true, true, true, true, true, false, false]);
    assert_eq!(weekdays.service_id(), "srv1111100");
    let sunday = DayPattern::new([false, false, false, false, false, false, true]);
    assert_eq!(sunday.service_id(), "srv0000001");
}

#[test]
fn travel_directions_widen_when_mixed() {
    let outbound = TravelDirections::Single(Direction::Outbound);
    let inbound = TravelDirections::Single(Direction::Inbound);
    assert_eq!(outbound.merge(outbound), outbound);
    assert_eq!(outbound.merge(inbound), TravelDirections::Both);
    assert_eq!(inbound.merge(TravelDirections::Both), TravelDirections::Both);
}

#[test]
fn direction_flag_parse() {
    assert_eq!(
        TravelDirections::from_flag(0),
        Some(TravelDirections::Single(Direction::Outbound))
    );
    assert_eq!(TravelDirections::from_flag(2), Some(TravelDirections::Both));
    assert_eq!(TravelDirections::from_flag(3), None);
}

#[test]
fn defaults_fill_missing_route_type_and_speed() {
    let plan = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![sample_window()],
        vec![sample_frequency()],
        sample_paths(),
        None,
    )
    .unwrap();
    assert_eq!(plan.frequencies[0].route_type, 3);
    assert_eq!(plan.frequencies[0].speed, 20.0);
}

#[test]
fn unknown_window_reference_is_rejected() {
    let mut frequency = sample_frequency();
    frequency.service_window_id = "overnight".into();
    let result = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![sample_window()],
        vec![frequency],
        sample_paths(),
        None,
    );
    assert!(matches!(
        result,
        Err(Error::UnknownServiceWindow { window, .. }) if window == "overnight"
    ));
}

#[test]
fn unknown_path_reference_is_rejected() {
    let mut frequency = sample_frequency();
    frequency.shape_id = "elsewhere".into();
    let result = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![sample_window()],
        vec![frequency],
        sample_paths(),
        None,
    );
    assert!(matches!(
        result,
        Err(Error::UnknownPath { path, .. }) if path == "elsewhere"
    ));
}

#[test]
fn windows_must_not_end_before_starting() {
    let mut window = sample_window();
    window.start_time = "09:00:00".into();
    window.end_time = "06:00:00".into();
    let result = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![window],
        vec![],
        sample_paths(),
        None,
    );
    assert!(matches!(result, Err(Error::EmptyWindow(_))));
}

#[test]
fn day_flags_other_than_binary_are_rejected() {
    let mut window = sample_window();
    window.wednesday = 7;
    let result = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![window],
        vec![],
        sample_paths(),
        None,
    );
    assert!(matches!(
        result,
        Err(Error::InvalidDayFlag { day: "wednesday", value: 7, .. })
    ));
}

#[test]
fn stops_missing_coordinates_are_dropped_and_duplicates_collapse() {
    let stops = vec![
        PlanStop {
            stop_id: "a".into(),
            stop_name: Some("First".into()),
            stop_lat: Some(40.0),
            stop_lon: Some(-88.0),
        },
        PlanStop {
            stop_id: "b".into(),
            stop_name: None,
            stop_lat: None,
            stop_lon: Some(-88.0),
        },
        PlanStop {
            stop_id: "c".into(),
            stop_name: Some("Shadow".into()),
            stop_lat: Some(40.0),
            stop_lon: Some(-88.0),
        },
    ];
    let plan = NetworkPlan::from_records(
        vec![sample_meta()],
        vec![sample_window()],
        vec![sample_frequency()],
        sample_paths(),
        Some(stops),
    )
    .unwrap();
    let sites = plan.stops.unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].id.as_ref(), "a");
}

#[test]
fn malformed_dates_are_rejected() {
    let mut meta = sample_meta();
    meta.start_date = "2026-01-01".into();
    let result = NetworkPlan::from_records(vec![meta], vec![], vec![], sample_paths(), None);
    assert!(matches!(result, Err(Error::InvalidDate(_))));
}
