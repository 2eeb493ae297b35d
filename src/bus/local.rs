use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::bus::{TopicBus, lock};
use crate::bus::subscription::{BusEvent, Subscription};
use crate::bus::topic::Topic;
use crate::utils::BusError;

#[derive(Debug, Default)]
struct LocalState {
    topics: HashMap<String, Topic>,
    opened: usize,
}

/// An in-process broker.
///
/// Every publish is delivered to the listeners attached to the topic at that
/// moment; nothing is retained. Clones share the same topics.
#[derive(Debug, Default, Clone)]
pub struct LocalBus {
    state: Arc<Mutex<LocalState>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        lock(&self.state)
    }

    /// Number of listeners currently attached to `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.state()
            .topics
            .get(topic)
            .map_or(0, |t| t.listeners.len())
    }

    /// Total number of listeners ever opened on this bus.
    pub fn subscriptions_opened(&self) -> usize {
        self.state().opened
    }

    /// Simulates a server-initiated close: every listener receives
    /// `Complete` and is detached.
    pub fn close(&self) {
        let mut state = self.state();
        for topic in state.topics.values_mut() {
            topic.complete_all();
        }
        info!("Local bus closed");
    }

    /// Pushes an error to every listener of `topic`.
    pub fn fail(&self, topic: &str, message: &str) {
        if let Some(t) = self.state().topics.get_mut(topic) {
            t.deliver(|| BusEvent::Error(BusError::Remote(message.to_string())));
        }
    }
}

#[async_trait]
impl TopicBus for LocalBus {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4().to_string();

        {
            let mut state = self.state();
            state
                .topics
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic))
                .subscribe(id.clone(), tx);
            state.opened += 1;
        }
        debug!("Listener {} attached to '{}'", id, topic);

        let shared = self.state.clone();
        let name = topic.to_string();
        Ok(Subscription::new(id, topic, rx, move |id| {
            if let Some(t) = lock(&shared).topics.get_mut(&name) {
                if t.unsubscribe(id) {
                    debug!("Listener {} detached from '{}'", id, name);
                }
            }
        }))
    }

    async fn publish(&self, topic: &str, payload: Value) -> Result<(), BusError> {
        match self.state().topics.get_mut(topic) {
            Some(t) if !t.is_empty() => t.deliver(|| BusEvent::Next(payload.clone())),
            _ => debug!("Topic '{}' has no listeners, dropping message", topic),
        }
        Ok(())
    }
}
