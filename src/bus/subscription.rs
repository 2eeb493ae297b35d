use std::fmt;

use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

use crate::utils::BusError;

pub type ListenerId = String;

/// One delivery from the bus to a subscription: the channel form of the
/// `next`/`error`/`complete` callbacks.
#[derive(Debug)]
pub enum BusEvent {
    Next(Value),
    Error(BusError),
    Complete,
}

type ReleaseHook = Box<dyn FnOnce(&ListenerId) + Send>;

/// An active topic listener.
///
/// The subscription owns its event receiver and a release hook that detaches
/// the listener from the bus. The hook runs exactly once, either from
/// [`Subscription::unsubscribe`] or when the subscription is dropped.
pub struct Subscription {
    id: ListenerId,
    topic: String,
    events: UnboundedReceiver<BusEvent>,
    release: Option<ReleaseHook>,
}

impl Subscription {
    pub fn new(
        id: ListenerId,
        topic: &str,
        events: UnboundedReceiver<BusEvent>,
        release: impl FnOnce(&ListenerId) + Send + 'static,
    ) -> Self {
        Self {
            id,
            topic: topic.to_string(),
            events,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Waits for the next event. Returns `None` once the bus has dropped
    /// every sender for this listener.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.events.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Detaches the listener from the bus. Best effort: nothing is awaited.
    pub fn unsubscribe(mut self) {
        self.release_listener();
    }

    fn release_listener(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.id);
            self.events.close();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_listener();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("released", &self.release.is_none())
            .finish()
    }
}
