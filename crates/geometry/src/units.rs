//! Measurement systems

use serde::{Deserialize, Serialize};

/// Unit system used for every user-facing distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Kilometers
    #[default]
    Metric,
    /// Statute miles
    Imperial,
}

impl MeasurementSystem {
    /// Meters per distance unit
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            MeasurementSystem::Metric => 1000.0,
            MeasurementSystem::Imperial => 1609.344,
        }
    }

    /// Short display name of the unit
    pub fn unit_name(&self) -> &'static str {
        match self {
            MeasurementSystem::Metric => "km",
            MeasurementSystem::Imperial => "mi.",
        }
    }
}

/// Convert meters into the given system's distance unit
pub fn convert_distance(meters: f64, unit: MeasurementSystem) -> f64 {
    meters / unit.meters_per_unit()
}
