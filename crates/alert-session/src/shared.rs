//! Mutex-guarded session handle for async callers

use crate::listener::{AlertListener, ListenerId};
use crate::session::{AlertSession, SessionState};
use alerting::{AlertResult, EventBatch};
use geometry::Coordinate;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Cloneable handle serializing access to one [`AlertSession`]
#[derive(Clone)]
pub struct SharedAlertSession {
    inner: Arc<Mutex<AlertSession>>,
}

impl SharedAlertSession {
    pub fn new(session: AlertSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for several operations in a row
    pub async fn lock(&self) -> MutexGuard<'_, AlertSession> {
        self.inner.lock().await
    }

    pub async fn set_enabled(&self, enabled: bool) {
        self.inner.lock().await.set_enabled(enabled);
    }

    pub async fn update_location(&self, location: Option<Coordinate>) {
        self.inner.lock().await.update_location(location);
    }

    pub async fn on_event_batch(&self, batch: EventBatch) {
        self.inner.lock().await.on_event_batch(batch);
    }

    pub async fn subscribe(&self, listener: impl AlertListener + 'static) -> ListenerId {
        self.inner.lock().await.subscribe(listener)
    }

    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.lock().await.unsubscribe(id)
    }

    pub async fn current_result(&self) -> Option<AlertResult> {
        self.inner.lock().await.current_result().cloned()
    }

    pub async fn text_message(&self, distance_limit: f64) -> String {
        self.inner.lock().await.text_message(distance_limit)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state()
    }
}
