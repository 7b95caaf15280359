use crate::shared::Coordinate;
use geo::{Coord, LineString, Point};
use std::f64::consts::PI;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Equirectangular projection centered on a reference coordinate.
///
/// Distances come out in meters, accurate to a fraction of a percent at
/// network scale.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Coordinate,
    meters_per_degree_latitude: f64,
    meters_per_degree_longitude: f64,
}

impl LocalProjection {
    /// Centers the projection on the mean of the given coordinates.
    pub fn new(coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        let origin: Coordinate = coordinates.into_iter().sum();
        Self::centered_on(origin)
    }

    pub fn centered_on(origin: Coordinate) -> Self {
        let meters_per_degree = EARTH_RADIUS_METERS * PI / 180.0;
        Self {
            origin,
            meters_per_degree_latitude: meters_per_degree,
            meters_per_degree_longitude: meters_per_degree * origin.latitude.to_radians().cos(),
        }
    }

    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn project(&self, coordinate: &Coordinate) -> Point<f64> {
        Point::new(
            (coordinate.longitude - self.origin.longitude) * self.meters_per_degree_longitude,
            (coordinate.latitude - self.origin.latitude) * self.meters_per_degree_latitude,
        )
    }

    pub fn project_line(&self, coordinates: &[Coordinate]) -> LineString<f64> {
        LineString::from(
            coordinates
                .iter()
                .map(|coordinate| {
                    let point = self.project(coordinate);
                    Coord {
                        x: point.x(),
                        y: point.y(),
                    }
                })
                .collect::<Vec<_>>(),
        )
    }
}

#[test]
fn origin_projects_to_zero() {
    let origin = Coordinate::new(48.8566, 2.3522);
    let projection = LocalProjection::centered_on(origin);
    let point = projection.project(&origin);
    assert!(point.x().abs() < 1e-9);
    assert!(point.y().abs() < 1e-9);
}

#[test]
fn one_degree_of_latitude_is_about_111_km() {
    let projection = LocalProjection::centered_on(Coordinate::new(45.0, 0.0));
    let point = projection.project(&Coordinate::new(46.0, 0.0));
    assert!((point.y() - 111_195.0).abs() < 100.0);
    assert!(point.x().abs() < 1e-9);
}

#[test]
fn longitude_scale_shrinks_with_latitude() {
    let equator = LocalProjection::centered_on(Coordinate::new(0.0, 0.0));
    let arctic = LocalProjection::centered_on(Coordinate::new(60.0, 0.0));
    let at_equator = equator.project(&Coordinate::new(0.0, 1.0)).x();
    let at_sixty = arctic.project(&Coordinate::new(60.0, 1.0)).x();
    assert!((at_sixty / at_equator - 0.5).abs() < 1e-6);
}

#[test]
fn projected_distance_tracks_haversine() {
    let a = Coordinate::new(41.8781, -87.6298);
    let b = Coordinate::new(41.8881, -87.6198);
    let projection = LocalProjection::new([a, b]);
    let pa = projection.project(&a);
    let pb = projection.project(&b);
    let planar = ((pa.x() - pb.x()).powi(2) + (pa.y() - pb.y()).powi(2)).sqrt();
    let great_circle = a.haversine_distance(&b).as_meters();
    assert!((planar - great_circle).abs() < great_circle * 0.005);
}
