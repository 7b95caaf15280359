use crate::build::shapes::Shape;
use crate::feed::models::GtfsStop;
use crate::geometry::{Corridor, LocalProjection, Side};
use crate::plan::{NetworkPlan, StopSite};
use crate::shared::Distance;
use geo::Point;
use rayon::prelude::*;
use std::{collections::HashMap, sync::Arc};
use tracing::warn;

/// Timezones of networks that drive on the left. Everywhere else is
/// treated as right-hand traffic.
const LEFT_HAND_TRAFFIC_TIMEZONES: &[&str] = &[
    "Africa/Blantyre",
    "Africa/Dar_es_Salaam",
    "Africa/Gaborone",
    "Africa/Harare",
    "Africa/Johannesburg",
    "Africa/Kampala",
    "Africa/Lusaka",
    "Africa/Maputo",
    "Africa/Maseru",
    "Africa/Mbabane",
    "Africa/Nairobi",
    "Africa/Windhoek",
    "America/Barbados",
    "America/Guyana",
    "America/Jamaica",
    "America/Nassau",
    "America/Paramaribo",
    "America/Port_of_Spain",
    "Asia/Bangkok",
    "Asia/Colombo",
    "Asia/Dhaka",
    "Asia/Hong_Kong",
    "Asia/Jakarta",
    "Asia/Jayapura",
    "Asia/Karachi",
    "Asia/Kathmandu",
    "Asia/Kolkata",
    "Asia/Kuala_Lumpur",
    "Asia/Macau",
    "Asia/Makassar",
    "Asia/Singapore",
    "Asia/Thimphu",
    "Asia/Tokyo",
    "Australia/Adelaide",
    "Australia/Brisbane",
    "Australia/Darwin",
    "Australia/Hobart",
    "Australia/Melbourne",
    "Australia/Perth",
    "Australia/Sydney",
    "Europe/Dublin",
    "Europe/Guernsey",
    "Europe/Isle_of_Man",
    "Europe/Jersey",
    "Europe/London",
    "Europe/Malta",
    "Indian/Maldives",
    "Indian/Mauritius",
    "Pacific/Auckland",
    "Pacific/Fiji",
    "Pacific/Port_Moresby",
];

/// Stop selection settings: the corridor radius around each shape and the
/// side of the road traffic drives on, keyed by agency timezone.
pub struct PlacementConfig {
    pub radius: Distance,
    pub side_by_timezone: HashMap<String, Side>,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            radius: Distance::from_meters(400.0),
            side_by_timezone: LEFT_HAND_TRAFFIC_TIMEZONES
                .iter()
                .map(|&timezone| (timezone.to_owned(), Side::Left))
                .collect(),
        }
    }
}

impl PlacementConfig {
    /// Boarding side for an agency timezone. Unlisted timezones drive on
    /// the right.
    pub fn side_for(&self, timezone: &str) -> Side {
        self.side_by_timezone
            .get(timezone)
            .copied()
            .unwrap_or(Side::Right)
    }
}

/// A candidate stop selected for one shape.
#[derive(Clone)]
pub struct PlacedStop {
    pub id: Arc<str>,
    pub point: Point<f64>,
}

/// Stops chosen for the feed: the output rows plus, for plans with an
/// explicit stop registry, the candidates selected per shape.
pub struct StopPlacement {
    pub rows: Vec<GtfsStop>,
    pub by_shape: HashMap<String, Vec<PlacedStop>>,
    pub synthetic: bool,
}

pub fn place_stops(
    shapes: &[Shape],
    plan: &NetworkPlan,
    config: &PlacementConfig,
    projection: &LocalProjection,
) -> StopPlacement {
    match &plan.stops {
        Some(sites) => place_registered_stops(
            shapes,
            sites,
            &plan.meta.agency_timezone,
            config,
            projection,
        ),
        None => place_endpoint_stops(shapes),
    }
}

/// Selects, for every shape, the registered stops inside its corridor on
/// the boarding side of the direction of travel.
fn place_registered_stops(
    shapes: &[Shape],
    sites: &[StopSite],
    timezone: &str,
    config: &PlacementConfig,
    projection: &LocalProjection,
) -> StopPlacement {
    let side = config.side_for(timezone);
    let projected: Vec<PlacedStop> = sites
        .iter()
        .map(|site| PlacedStop {
            id: site.id.clone(),
            point: projection.project(&site.coordinate),
        })
        .collect();

    let by_shape: HashMap<String, Vec<PlacedStop>> = shapes
        .par_iter()
        .map(|shape| {
            let corridor = Corridor::new(&shape.planar, config.radius);
            let selected: Vec<PlacedStop> = projected
                .iter()
                .filter(|stop| {
                    corridor.contains(&stop.point) && corridor.side_of(&stop.point) == side
                })
                .cloned()
                .collect();
            if selected.is_empty() {
                warn!("No stops inside the corridor of shape {}", shape.id);
            }
            (shape.id.clone(), selected)
        })
        .collect();

    let rows = sites
        .iter()
        .map(|site| GtfsStop {
            stop_id: site.id.to_string(),
            stop_name: site.name.clone(),
            stop_lon: site.coordinate.longitude,
            stop_lat: site.coordinate.latitude,
        })
        .collect();

    StopPlacement {
        rows,
        by_shape,
        synthetic: false,
    }
}

pub fn synthetic_stop_ids(shape_id: &str) -> [String; 2] {
    [format!("stp-{shape_id}-0"), format!("stp-{shape_id}-1")]
}

/// Invents a stop at the first and last point of every shape.
fn place_endpoint_stops(shapes: &[Shape]) -> StopPlacement {
    let mut rows = Vec::with_capacity(shapes.len() * 2);
    for shape in shapes {
        let ids = synthetic_stop_ids(&shape.id);
        let endpoints = [shape.points.first(), shape.points.last()];
        for (i, (id, endpoint)) in ids.into_iter().zip(endpoints).enumerate() {
            let Some(coordinate) = endpoint else {
                continue;
            };
            rows.push(GtfsStop {
                stop_id: id,
                stop_name: Some(format!("Stop {i} on shape {}", shape.id)),
                stop_lon: coordinate.longitude,
                stop_lat: coordinate.latitude,
            });
        }
    }
    StopPlacement {
        rows,
        by_shape: HashMap::new(),
        synthetic: true,
    }
}

#[cfg(test)]
use crate::build::shapes::build_shapes;
#[cfg(test)]
use crate::geometry::GeometryRegistry;
#[cfg(test)]
use crate::plan::{Frequency, TravelDirections};
#[cfg(test)]
use crate::shared::Coordinate;

#[test]
fn side_lookup_defaults_to_right() {
    let config = PlacementConfig::default();
    assert_eq!(config.side_for("Europe/London"), Side::Left);
    assert_eq!(config.side_for("Asia/Tokyo"), Side::Left);
    assert_eq!(config.side_for("America/Chicago"), Side::Right);
    assert_eq!(config.side_for("Mars/Olympus_Mons"), Side::Right);
}

#[cfg(test)]
fn east_west_fixture() -> (GeometryRegistry, Vec<Shape>, Vec<StopSite>) {
    let registry = GeometryRegistry::new(vec![(
        Arc::from("main"),
        vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.0, -87.98)],
    )]);
    let frequency = Frequency {
        route_short_name: Arc::from("10"),
        route_long_name: "Main Street".into(),
        route_type: 3,
        window_id: Arc::from("peak"),
        directions: TravelDirections::Both,
        frequency: 4,
        speed: 20.0,
        path_id: Arc::from("main"),
    };
    let shapes = build_shapes(&registry, &[frequency]).unwrap();
    let sites = vec![
        StopSite {
            id: Arc::from("north"),
            name: Some("North side".into()),
            coordinate: Coordinate::new(40.001, -87.99),
        },
        StopSite {
            id: Arc::from("south"),
            name: Some("South side".into()),
            coordinate: Coordinate::new(39.999, -87.99),
        },
        StopSite {
            id: Arc::from("far"),
            name: Some("Far away".into()),
            coordinate: Coordinate::new(40.1, -87.99),
        },
    ];
    (registry, shapes, sites)
}

#[test]
fn right_hand_traffic_keeps_the_curb_side() {
    let (registry, shapes, sites) = east_west_fixture();
    let placement = place_registered_stops(
        &shapes,
        &sites,
        "America/Chicago",
        &PlacementConfig::default(),
        registry.projection(),
    );
    // Eastbound travel with right-hand traffic boards on the south side.
    let eastbound: Vec<&str> = placement.by_shape["main-1"]
        .iter()
        .map(|stop| stop.id.as_ref())
        .collect();
    assert_eq!(eastbound, ["south"]);
    // The reversed shape travels west, so the north stop is curb side.
    let westbound: Vec<&str> = placement.by_shape["main-0"]
        .iter()
        .map(|stop| stop.id.as_ref())
        .collect();
    assert_eq!(westbound, ["north"]);
}

#[test]
fn left_hand_traffic_flips_the_selection() {
    let (registry, shapes, sites) = east_west_fixture();
    let placement = place_registered_stops(
        &shapes,
        &sites,
        "Europe/London",
        &PlacementConfig::default(),
        registry.projection(),
    );
    let eastbound: Vec<&str> = placement.by_shape["main-1"]
        .iter()
        .map(|stop| stop.id.as_ref())
        .collect();
    assert_eq!(eastbound, ["north"]);
}

#[test]
fn corridor_radius_is_configurable() {
    let (registry, shapes, sites) = east_west_fixture();
    let config = PlacementConfig {
        radius: Distance::from_meters(50.0),
        ..Default::default()
    };
    let placement =
        place_registered_stops(&shapes, &sites, "America/Chicago", &config, registry.projection());
    // Both curb stops sit about 111 m out, past a 50 m corridor.
    assert!(placement.by_shape["main-1"].is_empty());
    assert!(placement.by_shape["main-0"].is_empty());
}

#[test]
fn endpoint_stops_cover_each_shape() {
    let (_, shapes, _) = east_west_fixture();
    let placement = place_endpoint_stops(&shapes);
    assert!(placement.synthetic);
    assert_eq!(placement.rows.len(), 4);
    let ids: Vec<&str> = placement
        .rows
        .iter()
        .map(|row| row.stop_id.as_str())
        .collect();
    assert_eq!(
        ids,
        ["stp-main-1-0", "stp-main-1-1", "stp-main-0-0", "stp-main-0-1"]
    );
    assert_eq!(
        placement.rows[0].stop_name.as_deref(),
        Some("Stop 0 on shape main-1")
    );
    // The reversed shape starts where the forward one ends.
    assert_eq!(placement.rows[0].stop_lon, placement.rows[3].stop_lon);
}
