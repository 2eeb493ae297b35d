use crate::config::AuthSettings;

/// Username and password presented to an [`Authenticator`](super::Authenticator).
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&AuthSettings> for Credentials {
    fn from(settings: &AuthSettings) -> Self {
        Self::new(settings.username.clone(), settings.password.clone())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Proof of a successful sign-in.
///
/// Only authenticators construct sessions, so holding one means the gate
/// has been passed.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    token: String,
}

impl Session {
    pub(crate) fn new(username: &str, token: String) -> Self {
        Self {
            username: username.to_string(),
            token,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Opaque token handed out by the broker (or a local UUID).
    pub fn token(&self) -> &str {
        &self.token
    }
}
