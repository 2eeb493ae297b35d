//! A minimal broker speaking the JSON frame protocol, enough to exercise the
//! WebSocket bus and authenticator end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::AbortHandle;
use tokio_tungstenite::accept_async;
use tungstenite::protocol::Message as WsMessage;

use crate::bus::message::{ClientMessage, ServerMessage};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password";
pub const TOKEN: &str = "test-token";

#[derive(Default)]
struct State {
    frames: Vec<String>,
    connections: Vec<UnboundedSender<WsMessage>>,
    tasks: Vec<AbortHandle>,
    subscribers: HashMap<String, Vec<(usize, UnboundedSender<WsMessage>)>>,
}

#[derive(Clone, Default)]
pub struct FakeBroker {
    state: Arc<Mutex<State>>,
}

fn frame(msg: &ServerMessage) -> WsMessage {
    WsMessage::text(serde_json::to_string(msg).unwrap())
}

impl FakeBroker {
    /// Starts the broker on an ephemeral port and returns it with its URL.
    pub async fn start() -> (Self, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let broker = FakeBroker::default();

        let accepting = broker.clone();
        tokio::spawn(async move {
            let mut next_id = 0;
            while let Ok((stream, _)) = listener.accept().await {
                next_id += 1;
                let task = tokio::spawn(accepting.clone().serve(next_id, stream));
                accepting.state.lock().unwrap().tasks.push(task.abort_handle());
            }
        });

        (broker, url)
    }

    async fn serve(self, conn_id: usize, stream: tokio::net::TcpStream) {
        let Ok(ws_stream) = accept_async(stream).await else {
            return;
        };
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
        self.state.lock().unwrap().connections.push(tx.clone());

        let writer = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                let closing = msg.is_close();
                if ws_sender.send(msg).await.is_err() || closing {
                    break;
                }
            }
        });
        self.state.lock().unwrap().tasks.push(writer.abort_handle());

        let mut authenticated = false;
        while let Some(Ok(msg)) = ws_receiver.next().await {
            let Ok(text) = msg.to_text() else { continue };
            let Ok(client_msg) = serde_json::from_str::<ClientMessage>(text) else {
                continue;
            };
            let mut state = self.state.lock().unwrap();
            state.frames.push(text.to_string());

            match client_msg {
                ClientMessage::Login { username, password } => {
                    let reply = if username == USERNAME && password == PASSWORD {
                        ServerMessage::LoginResponse {
                            token: TOKEN.to_string(),
                        }
                    } else {
                        ServerMessage::Error {
                            message: "invalid credentials".to_string(),
                        }
                    };
                    let _ = tx.send(frame(&reply));
                }
                ClientMessage::Auth { token } => {
                    if token == TOKEN {
                        authenticated = true;
                        let _ = tx.send(frame(&ServerMessage::Authenticated {}));
                    } else {
                        let _ = tx.send(frame(&ServerMessage::Error {
                            message: "authentication failed".to_string(),
                        }));
                        let _ = tx.send(WsMessage::Close(None));
                        break;
                    }
                }
                _ if !authenticated => {
                    let _ = tx.send(frame(&ServerMessage::Error {
                        message: "must authenticate first".to_string(),
                    }));
                }
                ClientMessage::Subscribe { topic } => {
                    state
                        .subscribers
                        .entry(topic)
                        .or_default()
                        .push((conn_id, tx.clone()));
                }
                ClientMessage::Unsubscribe { topic } => {
                    if let Some(subs) = state.subscribers.get_mut(&topic) {
                        subs.retain(|(id, _)| *id != conn_id);
                    }
                }
                ClientMessage::Publish {
                    topic,
                    payload,
                    message_id,
                    qos,
                } => {
                    let msg = ServerMessage::Message {
                        topic: topic.clone(),
                        payload,
                        timestamp: 0,
                        message_id: message_id.unwrap_or_default(),
                        qos: qos.unwrap_or(0),
                    };
                    for (_, sub) in state.subscribers.get(&topic).into_iter().flatten() {
                        let _ = sub.send(frame(&msg));
                    }
                }
            }
        }
    }

    /// Raw text of every frame received so far, in arrival order.
    pub fn frames(&self) -> Vec<String> {
        self.state.lock().unwrap().frames.clone()
    }

    /// Number of received frames whose `type` is `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.frames()
            .iter()
            .filter(|f| {
                serde_json::from_str::<serde_json::Value>(f).unwrap()["type"] == kind
            })
            .count()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Sends a `message` frame with a raw payload string to `topic`'s subscribers.
    pub fn inject(&self, topic: &str, payload: &str) {
        let msg = ServerMessage::Message {
            topic: topic.to_string(),
            payload: payload.to_string(),
            timestamp: 0,
            message_id: "injected".to_string(),
            qos: 0,
        };
        let state = self.state.lock().unwrap();
        for (_, sub) in state.subscribers.get(topic).into_iter().flatten() {
            let _ = sub.send(frame(&msg));
        }
    }

    /// Sends an `error` frame on every open connection.
    pub fn inject_error(&self, message: &str) {
        let msg = ServerMessage::Error {
            message: message.to_string(),
        };
        for conn in &self.state.lock().unwrap().connections {
            let _ = conn.send(frame(&msg));
        }
    }

    /// Drops every socket without a closing handshake.
    pub fn sever_all(&self) {
        for task in self.state.lock().unwrap().tasks.drain(..) {
            task.abort();
        }
    }

    /// Closes every open connection from the broker side.
    pub fn close_all(&self) {
        for conn in self.state.lock().unwrap().connections.drain(..) {
            let _ = conn.send(WsMessage::Close(None));
        }
    }
}

/// Polls `condition` until it holds, failing the test after two seconds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
