//! # topicpanel
//!
//! `topicpanel` is a small messaging panel for a topic-based message broker.
//! A user signs in, the panel subscribes to one topic, shows the most recent
//! message received on it and publishes the user's draft back to the same
//! topic.
//!
//! ## Core Modules
//!
//! - `auth`: the sign-in gate; a `Session` is required to mount the panel.
//! - `bus`: the `TopicBus` trait with a WebSocket client and an in-process bus.
//! - `config`: loads the injected `Settings` from file and environment.
//! - `panel`: the messaging panel state, commands and view.
//! - `utils`: error types and logging setup.

pub mod auth;
pub mod bus;
pub mod config;
pub mod panel;
pub mod utils;

#[cfg(test)]
mod tests;
