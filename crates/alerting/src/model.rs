//! Sector and band topology with per-band recency state

use crate::error::ConfigError;
use crate::settings::AlertConfig;
use geometry::{normalize_bearing, MeasurementSystem};
use serde::{Deserialize, Serialize};

/// Bearing range of one sector, degrees in (-180, 180]
///
/// The range is half-open: `min_bearing` is inside, `max_bearing` is not.
/// When `min_bearing > max_bearing` the range wraps through 180.
/// Equal bounds describe the whole circle (single-sector topology).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDefinition {
    pub label: String,
    pub min_bearing: f64,
    pub max_bearing: f64,
}

impl SectorDefinition {
    /// Range passes through 180/-180
    pub fn wraps(&self) -> bool {
        self.min_bearing > self.max_bearing
    }

    /// Whether the bearing falls into this sector
    pub fn contains(&self, bearing: f64) -> bool {
        if self.min_bearing == self.max_bearing {
            bearing.is_finite()
        } else if self.wraps() {
            bearing >= self.min_bearing || bearing < self.max_bearing
        } else {
            self.min_bearing <= bearing && bearing < self.max_bearing
        }
    }
}

/// Distance range of one band (distance units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandDefinition {
    pub min_distance: f64,
    pub max_distance: f64,
}

/// Accumulated events of one band since the last clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BandState {
    /// Sum of multiplicities
    pub count: u64,
    /// Newest event timestamp, 0 when empty
    pub latest_timestamp: i64,
}

impl BandState {
    pub(crate) fn record(&mut self, multiplicity: u32, timestamp: i64) {
        self.count += u64::from(multiplicity);
        self.latest_timestamp = self.latest_timestamp.max(timestamp);
    }
}

/// Mutable state of one sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorState {
    bands: Vec<BandState>,
    closest_distance: f64,
}

impl SectorState {
    fn new(band_count: usize) -> Self {
        Self {
            bands: vec![BandState::default(); band_count],
            closest_distance: f64::INFINITY,
        }
    }

    /// Band states in band order
    pub fn bands(&self) -> &[BandState] {
        &self.bands
    }

    /// Closest distance among recent events, infinite when there are none
    pub fn closest_distance(&self) -> f64 {
        self.closest_distance
    }

    /// Whether any recent event was recorded
    pub fn has_recent_activity(&self) -> bool {
        self.closest_distance.is_finite()
    }

    /// Total count over all bands
    pub fn total_count(&self) -> u64 {
        self.bands.iter().map(|band| band.count).sum()
    }

    pub(crate) fn band_mut(&mut self, index: usize) -> Option<&mut BandState> {
        self.bands.get_mut(index)
    }

    pub(crate) fn update_closest(&mut self, distance: f64) {
        self.closest_distance = self.closest_distance.min(distance);
    }

    fn clear(&mut self) {
        self.closest_distance = f64::INFINITY;
        self.bands.iter_mut().for_each(|band| *band = BandState::default());
    }
}

/// A sector definition paired with its state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSector {
    pub definition: SectorDefinition,
    pub state: SectorState,
}

impl AlertSector {
    pub fn label(&self) -> &str {
        &self.definition.label
    }
}

/// Static topology derived from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AlertParameters {
    pub sectors: Vec<SectorDefinition>,
    pub bands: Vec<BandDefinition>,
    pub unit: MeasurementSystem,
    pub recency_window_ms: i64,
}

impl AlertParameters {
    /// Build sectors and bands from a validated configuration
    ///
    /// Sector `i` is centered on `-180 + i * width`, so the first sector
    /// wraps around due south.
    pub fn from_config(config: &AlertConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.sector_labels.len();
        let width = 360.0 / count as f64;
        // Neighbours share the exact same boundary value so no bearing falls between them
        let boundaries: Vec<f64> = (0..count)
            .map(|i| normalize_bearing(-180.0 - width / 2.0 + i as f64 * width))
            .collect();

        let sectors = config
            .sector_labels
            .iter()
            .enumerate()
            .map(|(i, label)| SectorDefinition {
                label: label.clone(),
                min_bearing: boundaries[i],
                max_bearing: boundaries[(i + 1) % count],
            })
            .collect();

        let mut min_distance = 0.0;
        let bands = config
            .range_steps
            .iter()
            .map(|&max_distance| {
                let band = BandDefinition {
                    min_distance,
                    max_distance,
                };
                min_distance = max_distance;
                band
            })
            .collect();

        Ok(Self {
            sectors,
            bands,
            unit: config.measurement_system,
            recency_window_ms: config.recency_window_ms(),
        })
    }
}

/// All sectors with their band state, allocated once and cleared per cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertStatus {
    sectors: Vec<AlertSector>,
    bands: Vec<BandDefinition>,
    unit: MeasurementSystem,
}

impl AlertStatus {
    /// Allocate sector state for the given topology
    pub fn new(parameters: &AlertParameters) -> Self {
        let sectors = parameters
            .sectors
            .iter()
            .map(|definition| AlertSector {
                definition: definition.clone(),
                state: SectorState::new(parameters.bands.len()),
            })
            .collect();

        Self {
            sectors,
            bands: parameters.bands.clone(),
            unit: parameters.unit,
        }
    }

    /// Reset every sector without reallocating
    pub fn clear(&mut self) {
        self.sectors.iter_mut().for_each(|sector| sector.state.clear());
    }

    pub fn sectors(&self) -> &[AlertSector] {
        &self.sectors
    }

    /// Band topology shared by all sectors
    pub fn bands(&self) -> &[BandDefinition] {
        &self.bands
    }

    pub fn unit(&self) -> MeasurementSystem {
        self.unit
    }

    /// Look up a sector by label
    pub fn sector(&self, label: &str) -> Option<&AlertSector> {
        self.sectors.iter().find(|sector| sector.label() == label)
    }

    pub(crate) fn sectors_mut(&mut self) -> &mut [AlertSector] {
        &mut self.sectors
    }
}
