//! Coordinates and great-circle math

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (positive north)
    pub latitude: f64,
    /// Longitude in degrees (positive east)
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Point reached by travelling `distance_m` meters from here along the
    /// great circle with initial bearing `bearing_deg`
    ///
    /// Inverse of [`bearing`] and [`distance`]; used to place synthetic
    /// strikes at a known bearing and range when exercising the alert engine.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> Coordinate {
        let phi1 = self.latitude.to_radians();
        let lambda1 = self.longitude.to_radians();
        let theta = bearing_deg.to_radians();
        let delta = distance_m / EARTH_RADIUS_M;

        let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos())
                .atan2(delta.cos() - phi1.sin() * phi2.sin());

        Coordinate::new(phi2.to_degrees(), normalize_bearing(lambda2.to_degrees()))
    }
}

/// Fold an angle in degrees into (-180, 180]
pub fn normalize_bearing(angle: f64) -> f64 {
    let mut folded = angle % 360.0;
    if folded <= -180.0 {
        folded += 360.0;
    } else if folded > 180.0 {
        folded -= 360.0;
    }
    folded
}

/// Initial great-circle bearing from `from` to `to`, in degrees within (-180, 180]
///
/// 0 is north, 90 east, -90 west and 180 south.
pub fn bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Haversine great-circle distance in meters
pub fn distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = (to.latitude - from.latitude).to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}
