//! Geometry Utilities
//!
//! Provides great-circle bearing and distance between coordinates and
//! conversion of meters into the configured measurement system.

mod coordinate;
mod units;

pub use coordinate::{bearing, distance, normalize_bearing, Coordinate, EARTH_RADIUS_M};
pub use units::{convert_distance, MeasurementSystem};
