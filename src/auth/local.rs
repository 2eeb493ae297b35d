use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{Authenticator, Credentials, Session};
use crate::utils::AuthError;

/// Checks credentials against a single configured account.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    account: Credentials,
}

impl StaticAuthenticator {
    pub fn new(account: Credentials) -> Self {
        Self { account }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        if credentials.username != self.account.username
            || credentials.password != self.account.password
        {
            return Err(AuthError::InvalidCredentials);
        }
        debug!("Issuing local session for {}", credentials.username);
        Ok(Session::new(
            &credentials.username,
            Uuid::new_v4().to_string(),
        ))
    }
}
