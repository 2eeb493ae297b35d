//! The auth gate.
//!
//! The panel can only be mounted with a [`Session`], and a session can only
//! come out of an [`Authenticator`]. [`AuthGate::open`] is the single place
//! the binary signs in.

pub mod local;
pub mod session;
pub mod websocket;

use async_trait::async_trait;
use tracing::{error, info};

use crate::utils::AuthError;

pub use local::StaticAuthenticator;
pub use session::{Credentials, Session};
pub use websocket::WsAuthenticator;

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;
}

/// Blocks everything behind it until a session exists.
pub struct AuthGate<A> {
    authenticator: A,
}

impl<A: Authenticator> AuthGate<A> {
    pub fn new(authenticator: A) -> Self {
        Self { authenticator }
    }

    /// Signs in and logs the outcome.
    pub async fn open(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        match self.authenticator.sign_in(credentials).await {
            Ok(session) => {
                info!("Signed in as {}", session.username());
                Ok(session)
            }
            Err(e) => {
                error!("Sign-in failed for {}: {}", credentials.username, e);
                Err(e)
            }
        }
    }
}
