//! Subscriber registry

use alerting::AlertResult;
use std::collections::BTreeMap;

/// Payload delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum AlertEvent {
    /// Closest current activity
    Alert(AlertResult),
    /// No alert is currently computable
    Clear,
}

/// Receives alert broadcasts
pub trait AlertListener: Send {
    fn on_alert_event(&mut self, event: &AlertEvent);
}

impl<F> AlertListener for F
where
    F: FnMut(&AlertEvent) + Send,
{
    fn on_alert_event(&mut self, event: &AlertEvent) {
        self(event)
    }
}

/// Handle returned on subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Registered listeners in subscription order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: BTreeMap<ListenerId, Box<dyn AlertListener>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its handle
    pub fn insert(&mut self, listener: Box<dyn AlertListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, listener);
        id
    }

    /// Remove a listener, `false` if the handle is unknown
    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener
    pub fn broadcast(&mut self, event: &AlertEvent) {
        for listener in self.listeners.values_mut() {
            listener.on_alert_event(event);
        }
    }
}
