use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::auth::Session;
use crate::bus::{BusEvent, Subscription, TopicBus};
use crate::config::PanelSettings;
use crate::panel::clock::{Clock, SystemClock, iso_timestamp};
use crate::panel::command::PanelCommand;
use crate::panel::draft::Draft;
use crate::panel::view::{ALERT_HEADING, Alert, PanelView};

/// The most recent inbound message and when this client saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl ReceivedMessage {
    pub fn timestamp(&self) -> String {
        iso_timestamp(&self.received_at)
    }
}

/// What the input loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Subscribes to one topic, shows the latest message on it and publishes
/// the draft back to it.
///
/// Holds at most one [`Subscription`]. Bus failures never reach the view:
/// they are logged and the state is left as it was.
pub struct MessagingPanel<B: TopicBus + 'static> {
    bus: Arc<B>,
    session: Session,
    topic: String,
    subscription: Option<Subscription>,
    latest: Option<ReceivedMessage>,
    draft: Draft,
    clock: Arc<dyn Clock>,
}

impl<B: TopicBus + 'static> MessagingPanel<B> {
    /// Builds the panel and subscribes once.
    pub async fn mount(session: &Session, bus: Arc<B>, settings: &PanelSettings) -> Self {
        Self::mount_with_clock(session, bus, settings, Arc::new(SystemClock)).await
    }

    pub async fn mount_with_clock(
        session: &Session,
        bus: Arc<B>,
        settings: &PanelSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut panel = Self {
            bus,
            session: session.clone(),
            topic: settings.topic.clone(),
            subscription: None,
            latest: None,
            draft: Draft::new(settings.max_message_len),
            clock,
        };
        panel.subscribe().await;
        panel
    }

    /// Opens a listener on the topic unless one is already open.
    pub async fn subscribe(&mut self) {
        info!("Subscribing to \"{}\" topic.", self.topic);

        if self.subscription.is_some() {
            info!("Existing subscription found, skipping.");
            return;
        }

        match self.bus.subscribe(&self.topic).await {
            Ok(subscription) => {
                debug!("Listener {} open", subscription.id());
                self.subscription = Some(subscription);
            }
            Err(e) => error!("Error subscribing to topic: {}", e),
        }
    }

    /// Releases the listener if there is one.
    pub fn unsubscribe(&mut self) {
        info!("Unsubscribing to \"{}\" topic.", self.topic);

        match self.subscription.take() {
            Some(subscription) => subscription.unsubscribe(),
            None => info!("No existing subscriptions found."),
        }
    }

    /// Sends `{"msg": <draft>}` to the topic without waiting for the bus.
    ///
    /// The returned handle only matters to callers that want to know the
    /// send has been attempted; failures are logged either way. The draft
    /// is kept.
    pub fn publish_message(&self) -> JoinHandle<()> {
        let bus = self.bus.clone();
        let topic = self.topic.clone();
        let draft = self.draft.text().to_string();
        info!("Publishing message to \"{}\" topic: {}", topic, draft);

        tokio::spawn(async move {
            if let Err(e) = bus.publish(&topic, json!({ "msg": draft })).await {
                error!("Error publishing to topic \"{}\": {}", topic, e);
            }
        })
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft.set(text);
    }

    pub fn push_char(&mut self, c: char) -> bool {
        self.draft.push(c)
    }

    pub fn draft(&self) -> &str {
        self.draft.text()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn latest(&self) -> Option<&ReceivedMessage> {
        self.latest.as_ref()
    }

    /// Waits for the next event on the open subscription.
    ///
    /// Never resolves while unsubscribed or after the bus has dropped the
    /// listener, so it can sit in a `select!` next to user input.
    pub async fn next_event(&mut self) -> BusEvent {
        if let Some(subscription) = self.subscription.as_mut() {
            if let Some(event) = subscription.recv().await {
                return event;
            }
        }
        std::future::pending().await
    }

    /// Applies one bus event to the panel state.
    pub fn handle_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::Next(payload) => {
                debug!("Message received {}", payload);
                match message_text(&payload) {
                    Some(text) => {
                        self.latest = Some(ReceivedMessage {
                            text,
                            received_at: self.clock.now(),
                        });
                    }
                    None => warn!("Message without a `msg` field ignored: {}", payload),
                }
            }
            BusEvent::Error(e) => error!("Error subscribing to topic: {}", e),
            BusEvent::Complete => info!("Unsubscribed from topic"),
        }
    }

    /// Applies every event already queued, returning how many there were.
    /// Only the last message survives.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Runs one user command.
    pub async fn apply(&mut self, command: PanelCommand) -> Flow {
        match command {
            PanelCommand::Draft(text) => self.set_draft(&text),
            PanelCommand::Publish => {
                let _ = self.publish_message();
            }
            PanelCommand::Unsubscribe => self.unsubscribe(),
            PanelCommand::Resubscribe => self.subscribe().await,
            PanelCommand::Show => {}
            PanelCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn view(&self) -> PanelView {
        let alert = self
            .latest
            .as_ref()
            .filter(|latest| !latest.text.is_empty())
            .map(|latest| Alert {
                heading: ALERT_HEADING,
                body: format!("{} - {}", latest.timestamp(), latest.text),
            });

        PanelView {
            username: self.session.username().to_string(),
            topic: self.topic.clone(),
            subscribed: self.is_subscribed(),
            alert,
            draft: self.draft.text().to_string(),
            draft_len: self.draft.len(),
            max_len: self.draft.max_len(),
        }
    }

    /// Releases the subscription and drops the panel.
    pub fn teardown(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

/// Text shown for a payload: its `msg` field, stringified when it is not a
/// string. `None` when the field is missing or null.
fn message_text(payload: &Value) -> Option<String> {
    match payload.get("msg")? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
