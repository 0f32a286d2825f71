//! Proximity Alerting
//!
//! Classifies geolocated strike events into bearing sectors and distance
//! bands around an observer, derives the closest current activity, and
//! decides when signaling and notification tiers should fire.

mod aggregator;
mod classifier;
mod error;
mod event;
mod model;
mod policy;
mod settings;

pub use aggregator::{
    current_activity, latest_timestamp_within, recompute, sector_with_closest_event, text_summary,
    AlertResult,
};
pub use classifier::{classify_and_record, Classification};
pub use settings::{AlertConfig, SignalConfig};
pub use error::{ClassifyError, ConfigError, EventError};
pub use event::{Event, EventBatch};
pub use model::{
    AlertParameters, AlertSector, AlertStatus, BandDefinition, BandState, SectorDefinition,
    SectorState,
};
pub use policy::{NotificationAction, NotificationPolicy, PolicyDecision, ThresholdState, TierOutcome};

pub use geometry::{Coordinate, MeasurementSystem};
