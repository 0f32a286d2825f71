//! Debounced two-tier alert policy

use crate::aggregator::{latest_timestamp_within, AlertResult};
use crate::model::AlertStatus;
use crate::settings::AlertConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of evaluating one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    /// No activity within the tier's radius
    NoActivity,
    /// Newer qualifying activity, the tier should react
    Fire { latest: i64 },
    /// Qualifying activity was already reacted to
    Suppressed,
}

/// Radius and debounce memory of one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdState {
    /// Radius (distance units)
    pub distance_limit: f64,
    /// Latest event timestamp this tier fired for, 0 = never
    pub last_fired: i64,
}

impl ThresholdState {
    pub fn new(distance_limit: f64) -> Self {
        Self {
            distance_limit,
            last_fired: 0,
        }
    }

    /// Decide whether this tier fires for the current cycle
    pub fn evaluate(&mut self, result: Option<&AlertResult>, status: &AlertStatus) -> TierOutcome {
        match result {
            Some(result) if result.closest_distance <= self.distance_limit => {}
            _ => return TierOutcome::NoActivity,
        }

        let latest = latest_timestamp_within(status, self.distance_limit);
        if latest > self.last_fired {
            self.last_fired = latest;
            TierOutcome::Fire { latest }
        } else {
            TierOutcome::Suppressed
        }
    }
}

/// What to do with the user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Show or refresh the notification
    Show,
    /// Remove the outstanding notification
    Dismiss,
    /// Leave it as it is
    Keep,
}

/// Combined decision for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Emit the signal (vibration/sound)
    pub signal: bool,
    pub notification: NotificationAction,
}

/// Signaling and notification tiers with their debounce state
#[derive(Debug, Clone)]
pub struct NotificationPolicy {
    signaling: ThresholdState,
    notification: ThresholdState,
    notification_shown: bool,
}

impl NotificationPolicy {
    /// Create a policy with the given radii
    pub fn new(signaling_limit: f64, notification_limit: f64) -> Self {
        info!(
            "Creating notification policy: signaling <= {}, notification <= {}",
            signaling_limit, notification_limit
        );
        Self {
            signaling: ThresholdState::new(signaling_limit),
            notification: ThresholdState::new(notification_limit),
            notification_shown: false,
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.signaling_limit, config.notification_limit)
    }

    /// Evaluate both tiers for the current cycle
    ///
    /// A tier fires only for activity strictly newer than what it last fired
    /// for, so repeated recomputes over the same data stay silent.
    pub fn evaluate(&mut self, result: Option<&AlertResult>, status: &AlertStatus) -> PolicyDecision {
        let signal = match self.signaling.evaluate(result, status) {
            TierOutcome::Fire { latest } => {
                debug!("Signaling tier fired for activity at {}", latest);
                true
            }
            TierOutcome::Suppressed => {
                debug!("Signal suppressed: activity already signaled");
                false
            }
            TierOutcome::NoActivity => false,
        };

        let notification = match self.notification.evaluate(result, status) {
            TierOutcome::Fire { latest } => {
                debug!("Notification tier fired for activity at {}", latest);
                self.notification_shown = true;
                NotificationAction::Show
            }
            TierOutcome::Suppressed => {
                debug!("Notification suppressed: activity already notified");
                NotificationAction::Keep
            }
            TierOutcome::NoActivity if self.notification_shown => {
                self.notification_shown = false;
                NotificationAction::Dismiss
            }
            TierOutcome::NoActivity => NotificationAction::Keep,
        };

        PolicyDecision {
            signal,
            notification,
        }
    }

    pub fn signaling(&self) -> &ThresholdState {
        &self.signaling
    }

    pub fn notification(&self) -> &ThresholdState {
        &self.notification
    }

    /// Whether a notification is currently outstanding
    pub fn notification_shown(&self) -> bool {
        self.notification_shown
    }
}

impl Default for NotificationPolicy {
    fn default() -> Self {
        Self::from_config(&AlertConfig::default())
    }
}
