//! Alerting Error Types

use thiserror::Error;

/// Errors while placing an event into the sector/band topology
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// Bearing fell into no configured sector
    #[error("bearing {bearing} matches no sector")]
    NoSector { bearing: f64 },

    /// Distance could not be computed from the inputs
    #[error("distance to event is not finite")]
    NonFiniteDistance,
}

/// Errors for malformed strike events
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    /// Latitude or longitude is NaN or infinite
    #[error("event at {timestamp} has non-finite coordinate ({latitude}, {longitude})")]
    NonFiniteCoordinate {
        timestamp: i64,
        latitude: f64,
        longitude: f64,
    },

    /// Multiplicity must be at least one
    #[error("event at {0} has zero multiplicity")]
    ZeroMultiplicity(i64),
}

/// Errors while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Band list is empty
    #[error("at least one range step is required")]
    NoRangeSteps,

    /// Band maxima must be finite, positive, and strictly ascending
    #[error("range step {index} ({value}) must be finite, positive and greater than the previous step")]
    InvalidRangeStep { index: usize, value: f64 },

    /// Sector label list is empty
    #[error("at least one sector label is required")]
    NoSectorLabels,

    /// A threshold or window is not a positive finite number
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// Window does not fit into epoch milliseconds
    #[error("recency_window_minutes {0} is too large")]
    RecencyWindowTooLarge(u64),

    /// Underlying source could not be read or deserialized
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),
}
