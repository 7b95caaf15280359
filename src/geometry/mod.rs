use crate::shared::Coordinate;
use geo::LineString;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

mod corridor;
mod projection;

pub use corridor::*;
pub use projection::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not find geometry with name: {0}")]
    GeometryNotFound(String),
}

/// Named path geometries sharing one local projection centered on the mean
/// of every vertex in the collection.
pub struct GeometryRegistry {
    names: Vec<Arc<str>>,
    geographic: HashMap<Arc<str>, Vec<Coordinate>>,
    planar: HashMap<Arc<str>, LineString<f64>>,
    projection: LocalProjection,
}

impl GeometryRegistry {
    pub fn new(paths: Vec<(Arc<str>, Vec<Coordinate>)>) -> Self {
        let projection =
            LocalProjection::new(paths.iter().flat_map(|(_, points)| points.iter().copied()));
        let mut names = Vec::with_capacity(paths.len());
        let mut geographic = HashMap::with_capacity(paths.len());
        let mut planar = HashMap::with_capacity(paths.len());
        for (name, points) in paths {
            planar.insert(name.clone(), projection.project_line(&points));
            names.push(name.clone());
            geographic.insert(name, points);
        }
        Self {
            names,
            geographic,
            planar,
            projection,
        }
    }

    /// Path names in their input order.
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn geometry(&self, name: &str) -> Result<&[Coordinate], Error> {
        self.geographic
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::GeometryNotFound(name.to_owned()))
    }

    pub fn planar(&self, name: &str) -> Result<&LineString<f64>, Error> {
        self.planar
            .get(name)
            .ok_or_else(|| Error::GeometryNotFound(name.to_owned()))
    }

    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }
}

#[cfg(test)]
fn sample_registry() -> GeometryRegistry {
    GeometryRegistry::new(vec![
        (
            Arc::from("north"),
            vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.1, -88.0)],
        ),
        (
            Arc::from("east"),
            vec![Coordinate::new(40.0, -88.0), Coordinate::new(40.0, -87.9)],
        ),
    ])
}

#[test]
fn lookup_by_name() {
    let registry = sample_registry();
    assert_eq!(registry.geometry("north").unwrap().len(), 2);
    assert_eq!(registry.planar("east").unwrap().0.len(), 2);
}

#[test]
fn missing_names_are_reported() {
    let registry = sample_registry();
    assert!(matches!(
        registry.geometry("west"),
        Err(Error::GeometryNotFound(name)) if name == "west"
    ));
}

#[test]
fn names_keep_input_order() {
    let registry = sample_registry();
    let names: Vec<&str> = registry.names().iter().map(AsRef::as_ref).collect();
    assert_eq!(names, ["north", "east"]);
}
