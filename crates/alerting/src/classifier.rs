//! Event placement into sectors and bands

use crate::error::ClassifyError;
use crate::event::Event;
use crate::model::AlertStatus;
use geometry::{bearing, convert_distance, distance, Coordinate};

/// Where an event landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Index into `AlertStatus::sectors`
    pub sector_index: usize,
    /// Index into `AlertStatus::bands`, `None` beyond the last band
    pub band_index: Option<usize>,
    /// Bearing from the observer (degrees)
    pub bearing: f64,
    /// Distance from the observer (distance units)
    pub distance: f64,
    /// Event was inside the recency window
    pub recent: bool,
}

/// Record one event into its sector and band
///
/// The event goes to the first band whose maximum is strictly greater than
/// its distance. Independently of band placement, an event at or after
/// `recency_threshold_time` lowers the sector's closest distance, even when
/// it lies beyond the last band.
pub fn classify_and_record(
    status: &mut AlertStatus,
    event: &Event,
    observer: &Coordinate,
    recency_threshold_time: i64,
) -> Result<Classification, ClassifyError> {
    let bearing = bearing(observer, &event.coordinate);
    let sector_index = status
        .sectors()
        .iter()
        .position(|sector| sector.definition.contains(bearing))
        .ok_or(ClassifyError::NoSector { bearing })?;

    let distance = convert_distance(distance(observer, &event.coordinate), status.unit());
    if !distance.is_finite() {
        return Err(ClassifyError::NonFiniteDistance);
    }

    let band_index = status
        .bands()
        .iter()
        .position(|band| distance < band.max_distance);
    let recent = event.timestamp >= recency_threshold_time;

    let state = &mut status.sectors_mut()[sector_index].state;
    if let Some(band) = band_index.and_then(|index| state.band_mut(index)) {
        band.record(event.multiplicity, event.timestamp);
    }
    if recent {
        state.update_closest(distance);
    }

    Ok(Classification {
        sector_index,
        band_index,
        bearing,
        distance,
        recent,
    })
}
