use crate::feed::{
    Feed,
    models::{GtfsAgency, GtfsRoute, GtfsShapePoint, GtfsStopTime, GtfsTrip},
};
use crate::geometry::{self, GeometryRegistry};
use crate::plan::NetworkPlan;
use std::{collections::HashSet, time::Instant};
use thiserror::Error;
use tracing::debug;

mod calendar;
mod shapes;
mod stop_times;
mod stops;
mod trips;

pub use calendar::*;
pub use shapes::*;
pub use stop_times::*;
pub use stops::*;
pub use trips::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] geometry::Error),
    #[error("Frequency references unknown service window {0}")]
    UnknownWindow(String),
    #[error("Trip references unknown shape {0}")]
    UnknownShape(String),
}

/// Runs the synthesis pipeline from a normalized plan to a complete feed.
pub struct FeedBuilder<'a> {
    plan: &'a NetworkPlan,
    placement: PlacementConfig,
}

impl<'a> FeedBuilder<'a> {
    pub fn new(plan: &'a NetworkPlan) -> Self {
        Self {
            plan,
            placement: PlacementConfig::default(),
        }
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn build(self) -> Result<Feed, Error> {
        let plan = self.plan;

        debug!("Resolving calendar...");
        let now = Instant::now();
        let calendar = ServiceCalendar::resolve(&plan.windows);
        debug!("Resolving calendar took {:?}", now.elapsed());

        debug!("Building shapes...");
        let now = Instant::now();
        let registry = GeometryRegistry::new(plan.paths.clone());
        let shapes = build_shapes(&registry, &plan.frequencies)?;
        debug!("Building shapes took {:?}", now.elapsed());

        debug!("Placing stops...");
        let now = Instant::now();
        let placement = place_stops(&shapes, plan, &self.placement, registry.projection());
        debug!("Placing stops took {:?}", now.elapsed());

        debug!("Expanding trips...");
        let now = Instant::now();
        let trips = expand_trips(plan, &calendar, &shapes)?;
        debug!("Expanding trips took {:?}", now.elapsed());

        debug!("Interpolating stop times...");
        let now = Instant::now();
        let stop_times = build_stop_times(&trips, &shapes, &placement);
        debug!("Interpolating stop times took {:?}", now.elapsed());

        Ok(assemble(plan, &calendar, shapes, placement, trips, stop_times))
    }
}

fn assemble(
    plan: &NetworkPlan,
    calendar: &ServiceCalendar,
    shapes: Vec<Shape>,
    placement: StopPlacement,
    trips: Vec<Trip>,
    stop_times: Vec<GtfsStopTime>,
) -> Feed {
    let agency = GtfsAgency {
        agency_name: plan.meta.agency_name.clone(),
        agency_url: plan.meta.agency_url.clone(),
        agency_timezone: plan.meta.agency_timezone.clone(),
    };

    // One routes row per short name; later rows only add trips.
    let mut routes: Vec<GtfsRoute> = Vec::new();
    for frequency in &plan.frequencies {
        let id = route_id(&frequency.route_short_name);
        if routes.iter().any(|route| route.route_id == id) {
            continue;
        }
        routes.push(GtfsRoute {
            route_id: id,
            route_short_name: frequency.route_short_name.to_string(),
            route_long_name: frequency.route_long_name.clone(),
            route_type: frequency.route_type,
        });
    }

    let shape_rows: Vec<GtfsShapePoint> = shapes
        .iter()
        .flat_map(|shape| {
            shape
                .points
                .iter()
                .enumerate()
                .map(move |(sequence, point)| GtfsShapePoint {
                    shape_id: shape.id.clone(),
                    shape_pt_sequence: sequence as u32,
                    shape_pt_lon: point.longitude,
                    shape_pt_lat: point.latitude,
                })
        })
        .collect();

    let trip_rows: Vec<GtfsTrip> = trips
        .iter()
        .map(|trip| GtfsTrip {
            route_id: trip.route_id.clone(),
            trip_id: trip.id.clone(),
            direction_id: trip.direction.digit(),
            shape_id: trip.shape_id.clone(),
            service_id: trip.service_id.clone(),
        })
        .collect();

    // Stops no trip ever visits do not belong in the feed.
    let referenced: HashSet<&str> = stop_times.iter().map(|row| row.stop_id.as_str()).collect();
    let mut stop_rows = placement.rows;
    stop_rows.retain(|stop| referenced.contains(stop.stop_id.as_str()));

    Feed {
        agency,
        calendar: calendar.rows(plan.meta.start_date, plan.meta.end_date),
        routes,
        shapes: shape_rows,
        stops: stop_rows,
        trips: trip_rows,
        stop_times,
    }
}
