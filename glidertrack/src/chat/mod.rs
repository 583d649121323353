//! Chat transport abstraction.
//!
//! The tracking core talks to the chat through two traits:
//!
//! - [`ChatTransport`] - outward messages (text, live location markers)
//! - [`UpdateSource`] - inbound commands and locations
//!
//! [`TelegramClient`] implements both against the Telegram Bot API. Tests use
//! in-memory implementations.
//!
//! ```text
//! TelegramClient ──► UpdateSource ──► CommandDispatcher ──► Tracker
//!        ▲                                                    │
//!        └────────── ChatTransport ◄── BroadcastCycle ◄───────┘
//! ```

mod error;
mod telegram;

use std::future::Future;
use std::time::Duration;

use crate::coord::Coordinates;

pub use error::TransportError;
pub use telegram::{TelegramClient, TelegramConfig, DEFAULT_API_URL, DEFAULT_POLL_TIMEOUT_SECS};

/// Destination chat for outward messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a message previously sent by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub i64);

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sender {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Sender {
    /// Name used to attribute tracked entries: the username, or first and
    /// last name when no username is set.
    pub fn attribution_name(&self) -> Option<String> {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return Some(username.to_string());
        }

        let full = match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        };
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_string())
    }
}

/// Payload of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundContent {
    Text(String),
    Location(Coordinates),
}

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub sender: Option<Sender>,
    pub content: InboundContent,
}

/// Outward message operations used by the broadcaster and the dispatcher.
pub trait ChatTransport: Send + Sync {
    /// Send a text message.
    fn send_text(
        &self,
        chat: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<MessageHandle, TransportError>> + Send;

    /// Replace the text of a previously sent message.
    fn edit_text(
        &self,
        chat: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Send a live location marker that can be edited for `live_period`.
    fn send_live_location(
        &self,
        chat: ChatId,
        position: Coordinates,
        live_period: Duration,
    ) -> impl Future<Output = Result<MessageHandle, TransportError>> + Send;

    /// Move a live location marker.
    fn edit_live_location(
        &self,
        chat: ChatId,
        handle: MessageHandle,
        position: Coordinates,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Delete a previously sent message.
    fn delete_message(
        &self,
        chat: ChatId,
        handle: MessageHandle,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Source of inbound chat messages.
pub trait UpdateSource: Send + Sync {
    /// Wait for the next batch of inbound messages.
    ///
    /// An empty batch is normal (e.g. long-poll timeout).
    fn next_updates(&self) -> impl Future<Output = Result<Vec<InboundMessage>, TransportError>> + Send;
}
