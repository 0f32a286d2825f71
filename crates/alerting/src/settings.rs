//! Alert configuration

use crate::error::ConfigError;
use ::config::{Config, Environment, File};
use geometry::MeasurementSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Environment variable prefix, e.g. `STRIKEWATCH_SIGNALING_LIMIT=10`
const ENV_PREFIX: &str = "STRIKEWATCH";

/// Signal emitted by the signaling tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Vibration duration (milliseconds)
    pub vibration_ms: u64,
    /// Sound identifier, silent when absent
    pub sound: Option<String>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            vibration_ms: 40,
            sound: None,
        }
    }
}

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Whether alerting starts enabled
    pub enabled: bool,
    /// Events younger than this count as current activity (minutes)
    pub recency_window_minutes: u64,
    /// Upper limit of each distance band, ascending (distance units)
    pub range_steps: Vec<f64>,
    /// Sector labels, clockwise starting at due south
    pub sector_labels: Vec<String>,
    /// Unit system for all distances
    pub measurement_system: MeasurementSystem,
    /// Radius for the signaling tier (distance units)
    pub signaling_limit: f64,
    /// Radius for the notification tier (distance units)
    pub notification_limit: f64,
    /// Signal settings
    pub signal: SignalConfig,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            recency_window_minutes: 10,
            range_steps: vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0],
            sector_labels: ["S", "SW", "W", "NW", "N", "NE", "E", "SE"]
                .iter()
                .map(|label| label.to_string())
                .collect(),
            measurement_system: MeasurementSystem::Metric,
            signaling_limit: 25.0,
            notification_limit: 50.0,
            signal: SignalConfig::default(),
        }
    }
}

fn checked_window_ms(minutes: u64) -> Option<i64> {
    i64::try_from(minutes).ok()?.checked_mul(60_000)
}

impl AlertConfig {
    /// Tighter radii for users who only care about nearby cells
    pub fn close_range() -> Self {
        Self {
            signaling_limit: 10.0,
            notification_limit: 25.0,
            ..Default::default()
        }
    }

    /// Wider radii for early warning
    pub fn wide_range() -> Self {
        Self {
            signaling_limit: 50.0,
            notification_limit: 100.0,
            ..Default::default()
        }
    }

    /// Load from an optional file, overridden by `STRIKEWATCH_*` variables
    ///
    /// Nested keys use a double underscore, e.g. `STRIKEWATCH_SIGNAL__VIBRATION_MS`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AlertConfig = settings.try_deserialize()?;
        config.validate()?;
        info!("Loaded alert configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Recency window in milliseconds
    ///
    /// Saturates at `i64::MAX`; `validate` rejects windows that large.
    pub fn recency_window_ms(&self) -> i64 {
        checked_window_ms(self.recency_window_minutes).unwrap_or(i64::MAX)
    }

    /// Check ranges and ordering of all values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.range_steps.is_empty() {
            return Err(ConfigError::NoRangeSteps);
        }
        let mut previous = 0.0;
        for (index, &value) in self.range_steps.iter().enumerate() {
            if !value.is_finite() || value <= previous {
                return Err(ConfigError::InvalidRangeStep { index, value });
            }
            previous = value;
        }

        if self.sector_labels.is_empty() {
            return Err(ConfigError::NoSectorLabels);
        }

        if self.recency_window_minutes == 0 {
            return Err(ConfigError::NotPositive {
                field: "recency_window_minutes",
                value: 0.0,
            });
        }
        if checked_window_ms(self.recency_window_minutes).is_none() {
            return Err(ConfigError::RecencyWindowTooLarge(self.recency_window_minutes));
        }
        for (field, value) in [
            ("signaling_limit", self.signaling_limit),
            ("notification_limit", self.notification_limit),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        Ok(())
    }
}
