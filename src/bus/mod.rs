//! The `bus` module is the panel's view of the message broker.
//!
//! [`TopicBus`] is the seam: the panel only ever subscribes to and publishes
//! on a named topic. [`WsTopicBus`] talks to a broker over WebSockets,
//! [`LocalBus`] keeps everything in process.

pub mod local;
pub mod message;
pub mod subscription;
pub mod topic;
pub mod websocket;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::utils::BusError;

pub use local::LocalBus;
pub use subscription::{BusEvent, ListenerId, Subscription};
pub use websocket::WsTopicBus;

/// Subscribe/publish primitives of a message broker client.
#[async_trait]
pub trait TopicBus: Send + Sync {
    /// Opens a listener on `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BusError>;

    /// Sends `payload` to every listener of `topic`. Success means the
    /// request was handed to the broker, not that anyone received it.
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), BusError>;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests;
