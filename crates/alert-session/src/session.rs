//! Alert session state machine

use crate::collaborators::{AlertNotifier, Clock, LocationProvider};
use crate::listener::{AlertEvent, AlertListener, ListenerId, ListenerRegistry};
use crate::SessionError;
use alerting::{
    current_activity, recompute, text_summary, AlertConfig, AlertParameters, AlertResult,
    AlertStatus, Event, EventBatch, NotificationAction, NotificationPolicy, PolicyDecision,
};
use geometry::Coordinate;
use tracing::{debug, info, warn};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Alerting is switched off
    Disabled,
    /// Enabled but without an observer location, a fresh batch, or subscribers
    EnabledNoLocation,
    /// Enabled with everything needed to compute alerts
    EnabledValid,
}

/// Top-level alert orchestrator
///
/// Every entry point runs a full recompute and broadcast before returning.
/// The session is not meant for concurrent use; wrap it in a
/// [`SharedAlertSession`](crate::SharedAlertSession) to share it.
pub struct AlertSession {
    config: AlertConfig,
    recency_window_ms: i64,
    status: AlertStatus,
    policy: NotificationPolicy,
    enabled: bool,
    location: Option<Coordinate>,
    events: Option<Vec<Event>>,
    listeners: ListenerRegistry,
    location_provider: Box<dyn LocationProvider>,
    notifier: Box<dyn AlertNotifier>,
    clock: Box<dyn Clock>,
    state: SessionState,
    result: Option<AlertResult>,
    /// Last broadcast was a clear (or nothing was broadcast yet)
    cleared: bool,
}

impl AlertSession {
    /// Create a session from configuration and its collaborators
    pub fn new(
        config: AlertConfig,
        location_provider: Box<dyn LocationProvider>,
        notifier: Box<dyn AlertNotifier>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, SessionError> {
        let parameters = AlertParameters::from_config(&config)?;
        info!(
            "Creating alert session: {} sectors, {} bands, {:?}",
            parameters.sectors.len(),
            parameters.bands.len(),
            parameters.unit
        );

        let enabled = config.enabled;
        Ok(Self {
            recency_window_ms: parameters.recency_window_ms,
            status: AlertStatus::new(&parameters),
            policy: NotificationPolicy::from_config(&config),
            config,
            enabled,
            location: None,
            events: None,
            listeners: ListenerRegistry::new(),
            location_provider,
            notifier,
            clock,
            state: if enabled {
                SessionState::EnabledNoLocation
            } else {
                SessionState::Disabled
            },
            result: None,
            cleared: true,
        })
    }

    /// Switch alerting on or off
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Alerting {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        self.run_cycle();
    }

    /// New observer position, `None` when the location became invalid
    pub fn update_location(&mut self, location: Option<Coordinate>) {
        self.location = location;
        self.run_cycle();
    }

    /// New batch from the event source; historical replays are ignored
    pub fn on_event_batch(&mut self, batch: EventBatch) {
        if !batch.realtime {
            debug!("Ignoring historical batch of {} events", batch.events.len());
            return;
        }

        let events = batch
            .events
            .into_iter()
            .filter(|event| match event.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Rejecting event: {}", e);
                    false
                }
            })
            .collect();
        self.events = Some(events);
        self.run_cycle();
    }

    /// Attach a listener; the first one activates location updates
    pub fn subscribe(&mut self, listener: impl AlertListener + 'static) -> ListenerId {
        let first = self.listeners.is_empty();
        let id = self.listeners.insert(Box::new(listener));
        if first {
            info!("First alert listener attached, requesting location updates");
            self.location_provider.subscribe();
        }
        self.run_cycle();
        id
    }

    /// Detach a listener; the last one deactivates location updates
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        if !self.listeners.remove(id) {
            return false;
        }
        if self.listeners.is_empty() {
            info!("Last alert listener detached, releasing location updates");
            self.location_provider.unsubscribe();
        }
        self.run_cycle();
        true
    }

    /// Closest activity of the last valid cycle
    pub fn current_result(&self) -> Option<&AlertResult> {
        self.result.as_ref()
    }

    /// Sector status of the last cycle, only while valid
    pub fn current_status(&self) -> Option<&AlertStatus> {
        (self.state == SessionState::EnabledValid).then_some(&self.status)
    }

    /// Sectors within `distance_limit`, empty unless valid
    pub fn text_message(&self, distance_limit: f64) -> String {
        self.current_status()
            .map(|status| text_summary(status, distance_limit))
            .unwrap_or_default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    fn run_cycle(&mut self) {
        if !self.enabled {
            self.leave_valid(SessionState::Disabled);
            return;
        }
        let (Some(observer), Some(events)) = (self.location, self.events.as_deref()) else {
            self.leave_valid(SessionState::EnabledNoLocation);
            return;
        };
        if self.listeners.is_empty() {
            self.leave_valid(SessionState::EnabledNoLocation);
            return;
        }

        let now = self.clock.now_ms();
        recompute(&mut self.status, events, &observer, now, self.recency_window_ms);
        let result = current_activity(&self.status, self.status.unit());
        let decision = self.policy.evaluate(result.as_ref(), &self.status);
        self.deliver(decision, result.as_ref());

        self.state = SessionState::EnabledValid;
        match &result {
            Some(result) => {
                self.listeners.broadcast(&AlertEvent::Alert(result.clone()));
                self.cleared = false;
            }
            None => self.broadcast_clear(),
        }
        self.result = result;
    }

    fn deliver(&mut self, decision: PolicyDecision, result: Option<&AlertResult>) {
        if decision.signal {
            self.notifier.signal(&self.config.signal);
        }
        match (decision.notification, result) {
            (NotificationAction::Show, Some(result)) => {
                let text = text_summary(&self.status, self.config.notification_limit);
                self.notifier.show_notification(result, &text);
            }
            (NotificationAction::Dismiss, _) => self.notifier.dismiss_notification(),
            _ => {}
        }
    }

    fn leave_valid(&mut self, next: SessionState) {
        if self.state == SessionState::EnabledValid {
            debug!("Leaving valid alert state for {:?}", next);
            self.status.clear();
            self.result = None;
            let decision = self.policy.evaluate(None, &self.status);
            self.deliver(decision, None);
            self.broadcast_clear();
        }
        self.state = next;
    }

    fn broadcast_clear(&mut self) {
        if !self.cleared {
            self.listeners.broadcast(&AlertEvent::Clear);
            self.cleared = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};

    const OBSERVER: Coordinate = Coordinate::new(48.0, 11.0);
    const NOW: i64 = 1_700_000_000_000;

    type Log = Arc<Mutex<Vec<String>>>;

    struct RecordingProvider(Log);

    impl LocationProvider for RecordingProvider {
        fn subscribe(&mut self) {
            self.0.lock().unwrap().push("subscribe".into());
        }

        fn unsubscribe(&mut self) {
            self.0.lock().unwrap().push("unsubscribe".into());
        }
    }

    struct RecordingNotifier(Log);

    impl AlertNotifier for RecordingNotifier {
        fn signal(&mut self, signal: &alerting::SignalConfig) {
            self.0.lock().unwrap().push(format!("signal {}", signal.vibration_ms));
        }

        fn show_notification(&mut self, _result: &AlertResult, text: &str) {
            self.0.lock().unwrap().push(format!("show {text}"));
        }

        fn dismiss_notification(&mut self) {
            self.0.lock().unwrap().push("dismiss".into());
        }
    }

    struct ManualClock(Arc<AtomicI64>);

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Harness {
        session: AlertSession,
        provider: Log,
        notifier: Log,
        events: Arc<Mutex<Vec<AlertEvent>>>,
        clock: Arc<AtomicI64>,
    }

    impl Harness {
        fn new(config: AlertConfig) -> Self {
            let provider = Log::default();
            let notifier = Log::default();
            let clock = Arc::new(AtomicI64::new(NOW));
            let session = AlertSession::new(
                config,
                Box::new(RecordingProvider(Arc::clone(&provider))),
                Box::new(RecordingNotifier(Arc::clone(&notifier))),
                Box::new(ManualClock(Arc::clone(&clock))),
            )
            .unwrap();
            Self {
                session,
                provider,
                notifier,
                events: Arc::default(),
                clock,
            }
        }

        fn enabled() -> Self {
            Self::new(AlertConfig {
                enabled: true,
                ..Default::default()
            })
        }

        fn listen(&mut self) -> ListenerId {
            let events = Arc::clone(&self.events);
            self.session
                .subscribe(move |event: &AlertEvent| events.lock().unwrap().push(event.clone()))
        }

        fn received(&self) -> Vec<AlertEvent> {
            self.events.lock().unwrap().clone()
        }

        fn clears(&self) -> usize {
            self.received()
                .iter()
                .filter(|event| **event == AlertEvent::Clear)
                .count()
        }

        fn notifications(&self) -> Vec<String> {
            self.notifier.lock().unwrap().clone()
        }
    }

    fn strike(bearing: f64, km: f64, timestamp: i64) -> Event {
        Event::new(timestamp, OBSERVER.destination(bearing, km * 1000.0))
    }

    #[test]
    fn test_becomes_valid_with_all_inputs() {
        let mut h = Harness::enabled();
        assert_eq!(h.session.state(), SessionState::EnabledNoLocation);

        h.listen();
        h.session.update_location(Some(OBSERVER));
        assert_eq!(h.session.state(), SessionState::EnabledNoLocation);

        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(10.0, 12.0, NOW)]));
        assert_eq!(h.session.state(), SessionState::EnabledValid);

        let result = h.session.current_result().unwrap();
        assert_eq!(result.sector_label, "N");
        assert!((result.closest_distance - 12.0).abs() < 1e-6);
        assert!(matches!(h.received().last(), Some(AlertEvent::Alert(_))));
        assert_eq!(h.session.text_message(20.0), "N 12km");
        assert!(h.session.current_status().is_some());
    }

    #[test]
    fn test_disabled_session_stays_silent() {
        let mut h = Harness::new(AlertConfig::default());
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(0.0, 5.0, NOW)]));

        assert_eq!(h.session.state(), SessionState::Disabled);
        assert!(h.session.current_result().is_none());
        assert!(h.received().is_empty());
        assert!(h.notifications().is_empty());
        assert_eq!(h.session.text_message(100.0), "");
    }

    #[test]
    fn test_location_loss_clears_exactly_once() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]));
        assert!(h.session.current_result().is_some());

        h.session.update_location(None);
        h.session.update_location(None);
        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]));

        assert_eq!(h.clears(), 1);
        assert!(h.session.current_result().is_none());
        assert!(h.session.current_status().is_none());
        assert_eq!(h.session.state(), SessionState::EnabledNoLocation);
    }

    #[test]
    fn test_disable_clears_and_dismisses() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]));

        h.session.set_enabled(false);
        h.session.set_enabled(false);

        assert_eq!(h.session.state(), SessionState::Disabled);
        assert_eq!(h.clears(), 1);
        assert_eq!(h.notifications().last().map(String::as_str), Some("dismiss"));
    }

    #[test]
    fn test_same_batch_notifies_once() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        let batch = EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]);

        h.session.on_event_batch(batch.clone());
        h.clock.store(NOW + 60_000, Ordering::SeqCst);
        h.session.on_event_batch(batch);

        assert_eq!(h.notifications(), vec!["show N 30km".to_string()]);
        // Both cycles still broadcast the current activity
        assert_eq!(h.received().len(), 2);
    }

    #[test]
    fn test_close_strike_signals_and_notifies() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session.on_event_batch(EventBatch::realtime(vec![
            strike(90.0, 8.0, NOW),
            strike(180.0, 40.0, NOW - 1000),
        ]));

        assert_eq!(
            h.notifications(),
            vec!["signal 40".to_string(), "show E 8km, S 40km".to_string()]
        );
    }

    #[test]
    fn test_observer_movement_recomputes() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        let event = strike(0.0, 40.0, NOW);
        h.session.on_event_batch(EventBatch::realtime(vec![event]));
        assert_eq!(h.session.current_result().unwrap().sector_label, "N");

        // Move north past the strike
        h.session
            .update_location(Some(OBSERVER.destination(0.0, 60_000.0)));
        let result = h.session.current_result().unwrap();
        assert_eq!(result.sector_label, "S");
        assert!((result.closest_distance - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_historical_batch_is_ignored() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session
            .on_event_batch(EventBatch::historical(vec![strike(0.0, 5.0, NOW)]));

        assert_eq!(h.session.state(), SessionState::EnabledNoLocation);
        assert!(h.received().is_empty());
    }

    #[test]
    fn test_invalid_events_are_dropped() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session.on_event_batch(EventBatch::realtime(vec![
            Event::new(NOW, Coordinate::new(f64::NAN, 11.0)),
            strike(0.0, 5.0, NOW).with_multiplicity(0),
            strike(270.0, 15.0, NOW),
        ]));

        let status = h.session.current_status().unwrap();
        let total: u64 = status.sectors().iter().map(|s| s.state.total_count()).sum();
        assert_eq!(total, 1);
        assert_eq!(h.session.current_result().unwrap().sector_label, "W");
    }

    #[test]
    fn test_empty_batch_broadcasts_nothing_new() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session.on_event_batch(EventBatch::realtime(vec![]));

        assert_eq!(h.session.state(), SessionState::EnabledValid);
        assert!(h.session.current_result().is_none());
        // Nothing was alerted before, so there is nothing to clear
        assert!(h.received().is_empty());
    }

    #[test]
    fn test_activity_ageing_out_clears() {
        let mut h = Harness::enabled();
        h.listen();
        h.session.update_location(Some(OBSERVER));
        let batch = EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]);
        h.session.on_event_batch(batch.clone());

        h.clock.store(NOW + 11 * 60 * 1000, Ordering::SeqCst);
        h.session.on_event_batch(batch.clone());
        h.session.on_event_batch(batch);

        assert_eq!(h.clears(), 1);
        assert_eq!(h.session.state(), SessionState::EnabledValid);
        assert_eq!(
            h.notifications(),
            vec!["show N 30km".to_string(), "dismiss".to_string()]
        );
    }

    #[test]
    fn test_listener_lifecycle_drives_location_provider() {
        let mut h = Harness::enabled();
        let first = h.listen();
        let second = h.listen();
        h.session.update_location(Some(OBSERVER));
        h.session
            .on_event_batch(EventBatch::realtime(vec![strike(0.0, 30.0, NOW)]));

        assert!(h.session.unsubscribe(first));
        assert_eq!(h.session.state(), SessionState::EnabledValid);
        assert!(h.session.unsubscribe(second));
        assert!(!h.session.unsubscribe(second));

        assert_eq!(h.session.listener_count(), 0);
        assert_eq!(h.session.state(), SessionState::EnabledNoLocation);
        assert!(h.session.current_result().is_none());
        assert_eq!(
            *h.provider.lock().unwrap(),
            vec!["subscribe".to_string(), "unsubscribe".to_string()]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = AlertSession::new(
            AlertConfig {
                range_steps: vec![],
                ..Default::default()
            },
            Box::new(RecordingProvider(Log::default())),
            Box::new(RecordingNotifier(Log::default())),
            Box::new(ManualClock(Arc::new(AtomicI64::new(NOW)))),
        );
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    proptest! {
        #[test]
        fn repeated_cycles_fire_at_most_once(
            advances in prop::collection::vec(0i64..60_000, 1..20),
            km in 1.0f64..45.0
        ) {
            let mut h = Harness::enabled();
            h.listen();
            h.session.update_location(Some(OBSERVER));
            let batch = EventBatch::realtime(vec![strike(0.0, km, NOW)]);

            let mut now = NOW;
            for advance in advances {
                now += advance;
                h.clock.store(now, Ordering::SeqCst);
                h.session.on_event_batch(batch.clone());
            }

            let shows = h.notifications().iter().filter(|n| n.starts_with("show")).count();
            let signals = h.notifications().iter().filter(|n| n.starts_with("signal")).count();
            prop_assert_eq!(shows, 1);
            prop_assert!(signals <= 1);
        }
    }
}
