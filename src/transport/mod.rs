//! # Transport Boundary
//!
//! What the reminder engine needs from the chat platform: a way to send text to a
//! user, and the vocabulary of inbound user events.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;

pub use discord::DiscordTransport;

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` to the user identified by `user_id`
    async fn send(&self, user_id: &str, text: &str) -> Result<()>;
}

/// Command invocations understood by the configuration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardCommand {
    /// Entry point, opens the main menu
    Start,
    /// Remove every subscription of the caller
    UnsubscribeAll,
    /// Abandon the configuration in progress
    Cancel,
    /// Ask forgiveness for a specific sin
    Istighfar,
}

/// Something a user did that the wizard reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Command(WizardCommand),
    Text(String),
    /// Menu tap carrying the opaque tag of the pressed button
    Tap(String),
}

/// Typed input becomes a wizard event only in direct messages
pub fn text_event(content: &str, is_direct: bool) -> Option<UserEvent> {
    is_direct.then(|| UserEvent::Text(content.to_string()))
}
