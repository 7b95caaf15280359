use crate::shared::Distance;
use geo::{Coord, EuclideanDistance, Line, LineString, Point};

/// Side of a directed path, facing along the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// A fixed-radius band around a projected path, with flat ends.
///
/// Membership matches a buffer with flat caps and round joins: points are
/// inside when they sit within the radius measured perpendicular to some
/// segment, or within the radius of an interior vertex. Nothing past the
/// perpendicular through either path endpoint belongs to the corridor.
pub struct Corridor {
    segments: Vec<Line<f64>>,
    radius: f64,
}

impl Corridor {
    pub fn new(line: &LineString<f64>, radius: Distance) -> Self {
        Self {
            segments: line.lines().collect(),
            radius: radius.as_meters(),
        }
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        if self
            .segments
            .iter()
            .any(|segment| perpendicular_within(segment, point, self.radius))
        {
            return true;
        }
        self.interior_vertices()
            .any(|vertex| point.euclidean_distance(&Point::from(vertex)) <= self.radius)
    }

    /// Classifies a point against the nearest segment of the path. Points
    /// exactly on the path count as right. Distance ties go to the earlier
    /// segment.
    pub fn side_of(&self, point: &Point<f64>) -> Side {
        let mut nearest: Option<(&Line<f64>, f64)> = None;
        for segment in &self.segments {
            let distance = point.euclidean_distance(segment);
            match nearest {
                Some((_, best)) if distance >= best => {}
                _ => nearest = Some((segment, distance)),
            }
        }
        let Some((segment, _)) = nearest else {
            return Side::Right;
        };
        let cross = segment.dx() * (point.y() - segment.start.y)
            - segment.dy() * (point.x() - segment.start.x);
        if cross > 0.0 { Side::Left } else { Side::Right }
    }

    fn interior_vertices(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.segments.iter().skip(1).map(|segment| segment.start)
    }
}

fn perpendicular_within(segment: &Line<f64>, point: &Point<f64>, radius: f64) -> bool {
    let dx = segment.dx();
    let dy = segment.dy();
    let length_squared = dx * dx + dy * dy;
    if length_squared == 0.0 {
        return false;
    }
    let t = ((point.x() - segment.start.x) * dx + (point.y() - segment.start.y) * dy)
        / length_squared;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    let foot = Point::new(segment.start.x + t * dx, segment.start.y + t * dy);
    point.euclidean_distance(&foot) <= radius
}

#[cfg(test)]
fn straight_corridor() -> Corridor {
    let line = LineString::from(vec![(0.0, 0.0), (100.0, 0.0)]);
    Corridor::new(&line, Distance::from_meters(10.0))
}

#[test]
fn points_beside_the_path_are_inside() {
    let corridor = straight_corridor();
    assert!(corridor.contains(&Point::new(50.0, 5.0)));
    assert!(corridor.contains(&Point::new(50.0, -9.9)));
    assert!(corridor.contains(&Point::new(0.0, 10.0)));
}

#[test]
fn points_too_far_out_are_outside() {
    let corridor = straight_corridor();
    assert!(!corridor.contains(&Point::new(50.0, 10.1)));
    assert!(!corridor.contains(&Point::new(50.0, -25.0)));
}

#[test]
fn flat_ends_cut_off_beyond_the_endpoints() {
    let corridor = straight_corridor();
    assert!(!corridor.contains(&Point::new(-5.0, 0.0)));
    assert!(!corridor.contains(&Point::new(105.0, 0.0)));
    assert!(!corridor.contains(&Point::new(-1.0, 5.0)));
}

#[test]
fn interior_corners_are_rounded() {
    let line = LineString::from(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
    let corridor = Corridor::new(&line, Distance::from_meters(10.0));
    // Just outside both perpendicular bands, within the elbow disk.
    assert!(corridor.contains(&Point::new(107.0, -7.0)));
    assert!(!corridor.contains(&Point::new(108.0, -8.0)));
}

#[test]
fn left_is_left_of_the_direction_of_travel() {
    let corridor = straight_corridor();
    assert_eq!(corridor.side_of(&Point::new(50.0, 5.0)), Side::Left);
    assert_eq!(corridor.side_of(&Point::new(50.0, -5.0)), Side::Right);
}

#[test]
fn side_flips_when_the_path_reverses() {
    let line = LineString::from(vec![(100.0, 0.0), (0.0, 0.0)]);
    let corridor = Corridor::new(&line, Distance::from_meters(10.0));
    assert_eq!(corridor.side_of(&Point::new(50.0, 5.0)), Side::Right);
    assert_eq!(corridor.side_of(&Point::new(50.0, -5.0)), Side::Left);
}

#[test]
fn side_uses_the_nearest_segment() {
    let line = LineString::from(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]);
    let corridor = Corridor::new(&line, Distance::from_meters(10.0));
    // Nearest to the second, northbound segment, on its left.
    assert_eq!(corridor.side_of(&Point::new(95.0, 50.0)), Side::Left);
    // Nearest to the first, eastbound segment, on its left.
    assert_eq!(corridor.side_of(&Point::new(50.0, 3.0)), Side::Left);
    assert_eq!(corridor.side_of(&Point::new(50.0, -3.0)), Side::Right);
}
