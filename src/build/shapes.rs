use crate::geometry::{self, GeometryRegistry};
use crate::plan::{Direction, Frequency, TravelDirections};
use crate::shared::{Coordinate, Distance};
use geo::{EuclideanLength, LineString};
use std::{collections::HashMap, sync::Arc};

/// One directed, fully materialized shape.
pub struct Shape {
    pub id: String,
    pub path_id: Arc<str>,
    pub direction: Direction,
    pub points: Vec<Coordinate>,
    pub planar: LineString<f64>,
    pub length: Distance,
}

pub fn shape_id(path_id: &str, direction: Direction) -> String {
    format!("{path_id}-{}", direction.digit())
}

/// Materializes a directed shape per path and direction of travel, in path
/// input order. Paths served in both directions get the forward shape
/// followed by its reverse; paths no frequency row references are dropped.
pub fn build_shapes(
    registry: &GeometryRegistry,
    frequencies: &[Frequency],
) -> Result<Vec<Shape>, geometry::Error> {
    let mut travel: HashMap<&str, TravelDirections> = HashMap::new();
    for frequency in frequencies {
        travel
            .entry(frequency.path_id.as_ref())
            .and_modify(|directions| *directions = directions.merge(frequency.directions))
            .or_insert(frequency.directions);
    }

    let mut shapes = Vec::new();
    for name in registry.names() {
        let Some(&directions) = travel.get(name.as_ref()) else {
            continue;
        };
        let points = registry.geometry(name)?;
        match directions {
            TravelDirections::Both => {
                shapes.push(make_shape(registry, name, Direction::Inbound, points.to_vec()));
                let mut reversed = points.to_vec();
                reversed.reverse();
                shapes.push(make_shape(registry, name, Direction::Outbound, reversed));
            }
            TravelDirections::Single(direction) => {
                shapes.push(make_shape(registry, name, direction, points.to_vec()));
            }
        }
    }
    Ok(shapes)
}

fn make_shape(
    registry: &GeometryRegistry,
    path_id: &Arc<str>,
    direction: Direction,
    points: Vec<Coordinate>,
) -> Shape {
    let planar = registry.projection().project_line(&points);
    let length = Distance::from_meters(planar.euclidean_length());
    Shape {
        id: shape_id(path_id, direction),
        path_id: path_id.clone(),
        direction,
        points,
        planar,
        length,
    }
}

#[cfg(test)]
fn test_registry() -> GeometryRegistry {
    GeometryRegistry::new(vec![
        (
            Arc::from("main"),
            vec![
                Coordinate::new(40.0, -88.0),
                Coordinate::new(40.0, -87.99),
                Coordinate::new(40.01, -87.99),
            ],
        ),
        (
            Arc::from("loop"),
            vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.02, -88.0)],
        ),
    ])
}

#[cfg(test)]
fn test_frequency(path: &str, direction: u8) -> Frequency {
    Frequency {
        route_short_name: Arc::from("10"),
        route_long_name: "Main Street".into(),
        route_type: 3,
        window_id: Arc::from("peak"),
        directions: TravelDirections::from_flag(direction).unwrap(),
        frequency: 4,
        speed: 20.0,
        path_id: Arc::from(path),
    }
}

#[test]
fn both_directions_get_forward_then_reversed() {
    let registry = test_registry();
    let shapes = build_shapes(&registry, &[test_frequency("main", 2)]).unwrap();
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].id, "main-1");
    assert_eq!(shapes[1].id, "main-0");
    let forward: Vec<Coordinate> = shapes[0].points.clone();
    let mut reversed = shapes[1].points.clone();
    reversed.reverse();
    assert_eq!(forward, reversed);
    assert_eq!(shapes[0].length, shapes[1].length);
}

#[test]
fn single_direction_keeps_points_verbatim() {
    let registry = test_registry();
    let shapes = build_shapes(&registry, &[test_frequency("main", 1)]).unwrap();
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].id, "main-1");
    assert_eq!(shapes[0].points, registry.geometry("main").unwrap());
}

#[test]
fn mixed_single_rows_widen_to_both() {
    let registry = test_registry();
    let shapes = build_shapes(
        &registry,
        &[test_frequency("main", 0), test_frequency("main", 1)],
    )
    .unwrap();
    let ids: Vec<&str> = shapes.iter().map(|shape| shape.id.as_str()).collect();
    assert_eq!(ids, ["main-1", "main-0"]);
}

#[test]
fn unreferenced_paths_are_dropped() {
    let registry = test_registry();
    let shapes = build_shapes(&registry, &[test_frequency("loop", 0)]).unwrap();
    let ids: Vec<&str> = shapes.iter().map(|shape| shape.id.as_str()).collect();
    assert_eq!(ids, ["loop-0"]);
}
