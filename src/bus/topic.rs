use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::bus::subscription::{BusEvent, ListenerId};

/// The listeners currently attached to one topic.
///
/// Both bus implementations keep a map of these keyed by topic name. A
/// listener is the sending half of a [`Subscription`](super::Subscription)'s
/// event channel.
#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub listeners: HashMap<ListenerId, UnboundedSender<BusEvent>>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            listeners: HashMap::new(),
        }
    }

    /// Attaches a listener. Re-attaching an id replaces its sender.
    pub fn subscribe(&mut self, id: ListenerId, sender: UnboundedSender<BusEvent>) {
        self.listeners.insert(id, sender);
    }

    /// Detaches a listener, returning whether it was attached.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Sends one event per listener, built by `event`.
    ///
    /// Listeners whose receiving half is gone are dropped.
    pub fn deliver(&mut self, mut event: impl FnMut() -> BusEvent) {
        self.listeners.retain(|id, sender| match sender.send(event()) {
            Ok(()) => true,
            Err(_) => {
                warn!("Listener {} on '{}' is gone, detaching", id, self.name);
                false
            }
        });
    }

    /// Tells every listener the stream is over and forgets them.
    pub fn complete_all(&mut self) {
        for (_, sender) in self.listeners.drain() {
            let _ = sender.send(BusEvent::Complete);
        }
    }
}
