//! Strike events

use crate::error::EventError;
use geometry::Coordinate;
use serde::{Deserialize, Serialize};

fn default_multiplicity() -> u32 {
    1
}

/// A single geolocated detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Location of the detection
    pub coordinate: Coordinate,
    /// Number of detections aggregated into this event
    #[serde(default = "default_multiplicity")]
    pub multiplicity: u32,
}

impl Event {
    /// Create a single detection
    pub fn new(timestamp: i64, coordinate: Coordinate) -> Self {
        Self {
            timestamp,
            coordinate,
            multiplicity: 1,
        }
    }

    /// Set how many detections this event stands for
    pub fn with_multiplicity(mut self, multiplicity: u32) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Reject events the classifier cannot place
    pub fn validate(&self) -> Result<(), EventError> {
        if !self.coordinate.is_finite() {
            return Err(EventError::NonFiniteCoordinate {
                timestamp: self.timestamp,
                latitude: self.coordinate.latitude,
                longitude: self.coordinate.longitude,
            });
        }
        if self.multiplicity == 0 {
            return Err(EventError::ZeroMultiplicity(self.timestamp));
        }
        Ok(())
    }
}

/// Events delivered together by the event source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    /// Events in the batch
    pub events: Vec<Event>,
    /// Live data as opposed to a historical replay
    pub realtime: bool,
}

impl EventBatch {
    /// Batch of live data
    pub fn realtime(events: Vec<Event>) -> Self {
        Self {
            events,
            realtime: true,
        }
    }

    /// Batch replayed from history, never used for alerting
    pub fn historical(events: Vec<Event>) -> Self {
        Self {
            events,
            realtime: false,
        }
    }
}
