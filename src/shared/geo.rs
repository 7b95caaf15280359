use std::iter::Sum;

/// A length in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

/// A geographic WGS84 position.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Summing coordinates yields their mean. An empty sum is the default
/// coordinate.
impl Sum for Coordinate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let (count, lat, lon) = iter.fold((0usize, 0.0, 0.0), |(count, lat, lon), coordinate| {
            (count + 1, lat + coordinate.latitude, lon + coordinate.longitude)
        });
        if count == 0 {
            return Self::default();
        }
        Self::new(lat / count as f64, lon / count as f64)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another coordinate.
    pub fn haversine_distance(&self, other: &Self) -> Distance {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let half_dlat = (lat2 - lat1) / 2.0;
        let half_dlon = (other.longitude - self.longitude).to_radians() / 2.0;
        let a = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
        Distance::from_kilometers(2.0 * EARTH_RADIUS_KM * a.sqrt().asin())
    }
}

#[test]
fn distance_test() {
    let coord_a = Coordinate::new(48.85800943005911, 2.3514350059357927);
    let coord_b = Coordinate::new(51.5052389927712, -0.12495407345099824);
    let d = coord_a.haversine_distance(&coord_b);
    // Paris to London is ~343 km.
    assert!((d.as_kilometers() - 343.0).abs() < 5.0);
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn coordinate_sum_is_mean() {
    let mean: Coordinate = [
        Coordinate::new(10.0, 20.0),
        Coordinate::new(20.0, 40.0),
    ]
    .into_iter()
    .sum();
    assert_eq!(mean, Coordinate::new(15.0, 30.0));
}
