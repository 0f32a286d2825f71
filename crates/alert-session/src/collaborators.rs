//! External collaborators the session drives

use alerting::{AlertResult, SignalConfig};

/// Source of observer positions
///
/// The session subscribes when its first listener attaches and unsubscribes
/// when the last one detaches. Positions are pushed back through
/// `AlertSession::update_location`.
pub trait LocationProvider: Send {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
}

/// Platform delivery of signals and notifications
pub trait AlertNotifier: Send {
    /// Vibrate and/or play the configured sound
    fn signal(&mut self, signal: &SignalConfig);

    /// Show or refresh the persistent notification
    fn show_notification(&mut self, result: &AlertResult, text: &str);

    /// Remove the persistent notification
    fn dismiss_notification(&mut self);
}

/// Time source in epoch milliseconds
pub trait Clock: Send {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
