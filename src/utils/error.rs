//! The `error` module defines the error types used within `topicpanel`.
//!
//! Bus and auth failures are kept apart: the panel swallows `BusError`s into
//! the log, while an `AuthError` keeps the panel from ever being mounted.

use thiserror::Error;

/// Failures raised by a [`TopicBus`](crate::bus::TopicBus) implementation.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to connect to broker: {0}")]
    Connect(#[from] tungstenite::Error),

    #[error("broker connection is closed")]
    Closed,

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed payload on topic '{topic}': {reason}")]
    Malformed { topic: String, reason: String },

    #[error("broker rejected the session: {0}")]
    Rejected(String),

    #[error("broker reported an error: {0}")]
    Remote(String),
}

/// Failures raised while signing in.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("sign-in rejected: {0}")]
    Rejected(String),

    #[error("sign-in transport failure: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("unexpected sign-in response: {0}")]
    UnexpectedResponse(String),
}
