use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::debug;
use tungstenite::protocol::Message as WsMessage;

use crate::auth::{Authenticator, Credentials, Session};
use crate::bus::message::{ClientMessage, ServerMessage};
use crate::utils::AuthError;

/// Signs in against the broker's `login` frame.
///
/// The login runs on its own short-lived connection; the returned token is
/// then presented by [`WsTopicBus::connect`](crate::bus::WsTopicBus::connect).
#[derive(Debug, Clone)]
pub struct WsAuthenticator {
    endpoint: String,
}

impl WsAuthenticator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Authenticator for WsAuthenticator {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let (mut ws_stream, _) = connect_async(self.endpoint.as_str()).await?;

        let login = ClientMessage::Login {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };
        let frame = login
            .to_frame()
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
        ws_stream.send(frame).await?;

        let outcome = loop {
            let Some(frame) = ws_stream.next().await else {
                break Err(AuthError::UnexpectedResponse(
                    "connection closed before login response".to_string(),
                ));
            };
            let text = match frame? {
                WsMessage::Text(text) => text,
                _ => continue,
            };
            break match serde_json::from_str::<ServerMessage>(text.as_str()) {
                Ok(ServerMessage::LoginResponse { token }) => {
                    Ok(Session::new(&credentials.username, token))
                }
                Ok(ServerMessage::Error { message }) => Err(AuthError::Rejected(message)),
                Ok(other) => Err(AuthError::UnexpectedResponse(format!("{other:?}"))),
                Err(e) => Err(AuthError::UnexpectedResponse(e.to_string())),
            };
        };

        if let Err(e) = ws_stream.close(None).await {
            debug!("Closing login connection failed: {}", e);
        }
        outcome
    }
}
