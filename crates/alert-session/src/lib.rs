//! Alert Session
//!
//! Wires observer-location updates and strike batches into the alerting
//! engine and broadcasts the resulting alert (or a clear) to subscribers.

mod collaborators;
mod listener;
mod session;
mod shared;

pub use collaborators::{AlertNotifier, Clock, LocationProvider, SystemClock};
pub use listener::{AlertEvent, AlertListener, ListenerId, ListenerRegistry};
pub use session::{AlertSession, SessionState};
pub use shared::SharedAlertSession;

use alerting::ConfigError;
use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid alert configuration: {0}")]
    Config(#[from] ConfigError),
}
