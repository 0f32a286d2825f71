//! Full reclassification and closest-activity queries

use crate::classifier::classify_and_record;
use crate::event::Event;
use crate::model::{AlertSector, AlertStatus};
use geometry::{convert_distance, Coordinate, MeasurementSystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Closest current activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertResult {
    /// Label of the sector holding the closest recent event
    pub sector_label: String,
    /// Distance of that event (distance units)
    pub closest_distance: f64,
    /// Unit of `closest_distance`
    pub unit: MeasurementSystem,
}

impl AlertResult {
    pub fn unit_name(&self) -> &'static str {
        self.unit.unit_name()
    }
}

/// Clear the status and classify every event against the observer
///
/// Events with a timestamp at or after `now - recency_window_ms` are recent.
/// Events that cannot be classified are logged and skipped.
pub fn recompute<'a>(
    status: &'a mut AlertStatus,
    events: &[Event],
    observer: &Coordinate,
    now: i64,
    recency_window_ms: i64,
) -> &'a mut AlertStatus {
    status.clear();
    let recency_threshold_time = now.saturating_sub(recency_window_ms);

    let mut skipped = 0usize;
    for event in events {
        if let Err(e) = classify_and_record(status, event, observer, recency_threshold_time) {
            warn!("Skipping event at {}: {}", event.timestamp, e);
            skipped += 1;
        }
    }

    debug!(
        "Recomputed {} events ({} skipped), recency threshold {}",
        events.len(),
        skipped,
        recency_threshold_time
    );
    status
}

/// Sector with the globally smallest closest distance; ties keep the first
pub fn sector_with_closest_event(status: &AlertStatus) -> Option<&AlertSector> {
    let mut closest: Option<&AlertSector> = None;
    for sector in status.sectors() {
        if !sector.state.has_recent_activity() {
            continue;
        }
        match closest {
            Some(best) if best.state.closest_distance() <= sector.state.closest_distance() => {}
            _ => closest = Some(sector),
        }
    }
    closest
}

/// Current activity converted into `unit`, `None` when nothing recent was seen
pub fn current_activity(status: &AlertStatus, unit: MeasurementSystem) -> Option<AlertResult> {
    sector_with_closest_event(status).map(|sector| {
        let meters = sector.state.closest_distance() * status.unit().meters_per_unit();
        AlertResult {
            sector_label: sector.label().to_string(),
            closest_distance: convert_distance(meters, unit),
            unit,
        }
    })
}

/// Newest timestamp over all bands lying entirely within `distance_limit`
///
/// Returns 0 when no band qualifies or all qualifying bands are empty.
pub fn latest_timestamp_within(status: &AlertStatus, distance_limit: f64) -> i64 {
    let qualifying = status
        .bands()
        .iter()
        .take_while(|band| band.max_distance <= distance_limit)
        .count();

    status
        .sectors()
        .iter()
        .flat_map(|sector| sector.state.bands().iter().take(qualifying))
        .map(|band| band.latest_timestamp)
        .fold(0, i64::max)
}

/// Sectors within `distance_limit`, nearest first, e.g. `"N 12km, SW 18km"`
pub fn text_summary(status: &AlertStatus, distance_limit: f64) -> String {
    let mut nearby: Vec<&AlertSector> = status
        .sectors()
        .iter()
        .filter(|sector| {
            sector.state.has_recent_activity() && sector.state.closest_distance() <= distance_limit
        })
        .collect();
    nearby.sort_by(|a, b| a.state.closest_distance().total_cmp(&b.state.closest_distance()));

    let unit = status.unit().unit_name();
    nearby
        .iter()
        .map(|sector| {
            format!(
                "{} {:.0}{}",
                sector.label(),
                sector.state.closest_distance().round(),
                unit
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
