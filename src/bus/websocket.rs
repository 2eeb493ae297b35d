//! WebSocket topic bus
//!
//! Client side of the broker's JSON frame protocol. One connection carries
//! every subscription:
//! - a writer task drains an unbounded channel of outgoing frames into the
//!   socket, so publishing and releasing never await the network
//! - a reader task routes `message` frames to the listeners of their topic
//!   and completes every listener when the broker closes the stream
//! - the first listener on a topic sends `subscribe`, releasing the last one
//!   sends `unsubscribe`

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::spawn;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::connect_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

use crate::auth::Session;
use crate::bus::{TopicBus, lock};
use crate::bus::message::{ClientMessage, ServerMessage};
use crate::bus::subscription::{BusEvent, Subscription};
use crate::bus::topic::Topic;
use crate::config::BusSettings;
use crate::utils::BusError;

type Registry = Arc<Mutex<HashMap<String, Topic>>>;

/// A [`TopicBus`] backed by one authenticated WebSocket connection.
#[derive(Debug)]
pub struct WsTopicBus {
    outgoing: UnboundedSender<WsMessage>,
    registry: Registry,
    closed: Arc<AtomicBool>,
}

impl WsTopicBus {
    /// Connects to `settings.endpoint` and authenticates with the session
    /// token before any subscription is made.
    pub async fn connect(settings: &BusSettings, session: &Session) -> Result<Self, BusError> {
        let (ws_stream, _) = connect_async(settings.endpoint.as_str()).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        ws_sender
            .send(
                ClientMessage::Auth {
                    token: session.token().to_string(),
                }
                .to_frame()?,
            )
            .await?;
        await_authenticated(&mut ws_receiver).await?;
        info!(
            "Connected to {} ({}) as {}",
            settings.endpoint, settings.region, session.username()
        );

        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
        let registry: Registry = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    error!("Failed to send frame to broker: {}", e);
                    break;
                }
            }
            let _ = ws_sender.close().await;
            debug!("Send loop closed");
        });

        {
            let registry = registry.clone();
            let closed = closed.clone();
            spawn(async move {
                while let Some(frame) = ws_receiver.next().await {
                    match frame {
                        Ok(WsMessage::Text(text)) => dispatch_frame(&registry, text.as_str()),
                        Ok(WsMessage::Close(_)) => break,
                        Ok(other) => debug!("Ignoring non-text frame from broker: {:?}", other),
                        Err(e) => {
                            error!("Broker connection failed: {}", e);
                            let reason = e.to_string();
                            for topic in lock(&registry).values_mut() {
                                topic.deliver(|| BusEvent::Error(BusError::Remote(reason.clone())));
                            }
                            break;
                        }
                    }
                }
                closed.store(true, Ordering::SeqCst);
                for topic in lock(&registry).values_mut() {
                    topic.complete_all();
                }
                info!("Broker closed the connection");
            });
        }

        Ok(Self {
            outgoing: tx,
            registry,
            closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.outgoing.is_closed()
    }

    fn send(&self, msg: ClientMessage) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        self.outgoing
            .send(msg.to_frame()?)
            .map_err(|_| BusError::Closed)
    }
}

async fn await_authenticated<S>(ws_receiver: &mut S) -> Result<(), BusError>
where
    S: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
{
    while let Some(frame) = ws_receiver.next().await {
        let text = match frame? {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };
        match serde_json::from_str::<ServerMessage>(text.as_str()) {
            Ok(ServerMessage::Authenticated {}) => return Ok(()),
            Ok(ServerMessage::Error { message }) => return Err(BusError::Rejected(message)),
            Ok(other) => debug!("Ignoring frame before authentication: {:?}", other),
            Err(e) => warn!("Unreadable frame before authentication: {}", e),
        }
    }
    Err(BusError::Closed)
}

/// Routes one inbound text frame to the listeners it concerns.
pub(crate) fn dispatch_frame(registry: &Mutex<HashMap<String, Topic>>, text: &str) {
    match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Message {
            topic,
            payload,
            message_id,
            ..
        }) => {
            let mut registry = lock(registry);
            let Some(listeners) = registry.get_mut(&topic) else {
                debug!("No listeners for '{}', dropping {}", topic, message_id);
                return;
            };
            match serde_json::from_str::<Value>(&payload) {
                Ok(value) => listeners.deliver(|| BusEvent::Next(value.clone())),
                Err(e) => {
                    let reason = e.to_string();
                    listeners.deliver(|| {
                        BusEvent::Error(BusError::Malformed {
                            topic: topic.clone(),
                            reason: reason.clone(),
                        })
                    });
                }
            }
        }
        Ok(ServerMessage::Error { message }) => {
            warn!("Broker error: {}", message);
            for topic in lock(registry).values_mut() {
                topic.deliver(|| BusEvent::Error(BusError::Remote(message.clone())));
            }
        }
        Ok(other) => debug!("Ignoring frame: {:?}", other),
        Err(e) => warn!(
            "Invalid broker frame: {} | {}",
            e,
            text.chars().take(100).collect::<String>()
        ),
    }
}

#[async_trait]
impl TopicBus for WsTopicBus {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4().to_string();
        let first = {
            let mut registry = lock(&self.registry);
            let entry = registry
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic));
            let first = entry.is_empty();
            entry.subscribe(id.clone(), tx);
            first
        };

        if first {
            if let Err(e) = self.send(ClientMessage::Subscribe {
                topic: topic.to_string(),
            }) {
                if let Some(t) = lock(&self.registry).get_mut(topic) {
                    t.unsubscribe(&id);
                }
                return Err(e);
            }
            info!("Subscribed to '{}'", topic);
        }

        let registry = self.registry.clone();
        let outgoing = self.outgoing.clone();
        let name = topic.to_string();
        Ok(Subscription::new(id, topic, rx, move |id| {
            let last = match lock(&registry).get_mut(&name) {
                Some(t) => t.unsubscribe(id) && t.is_empty(),
                None => false,
            };
            if last {
                let frame = ClientMessage::Unsubscribe {
                    topic: name.clone(),
                }
                .to_frame();
                match frame.map(|f| outgoing.send(f)) {
                    Ok(Ok(())) => info!("Unsubscribed from '{}'", name),
                    _ => debug!("Connection gone, unsubscribe for '{}' not sent", name),
                }
            }
        }))
    }

    async fn publish(&self, topic: &str, payload: Value) -> Result<(), BusError> {
        let payload = serde_json::to_string(&payload)?;
        self.send(ClientMessage::Publish {
            topic: topic.to_string(),
            payload,
            message_id: Some(Uuid::new_v4().to_string()),
            qos: Some(0),
        })
    }
}
