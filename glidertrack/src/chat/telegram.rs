//! Telegram Bot API client.
//!
//! Implements [`ChatTransport`] and [`UpdateSource`] with plain JSON calls
//! over `reqwest`. Inbound updates are fetched with `getUpdates` long polling;
//! the client tracks the update offset itself so each update is delivered
//! once.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::error::TransportError;
use super::{
    ChatId, ChatTransport, InboundContent, InboundMessage, MessageHandle, Sender, UpdateSource,
};
use crate::coord::Coordinates;

/// Default Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default long-poll timeout for `getUpdates`.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

/// HTTP timeout for everything except long polling.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra time granted to a long poll beyond the server-side timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Connection settings for [`TelegramClient`].
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    pub token: String,
    /// Base URL of the Bot API.
    pub api_url: String,
    /// Server-side long-poll timeout.
    pub poll_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

/// Envelope every Bot API method replies with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<T, TransportError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(TransportError::JsonError(
                "response marked ok without a result".to_string(),
            )),
            (false, _) => Err(TransportError::from_api(
                self.error_code.unwrap_or_default(),
                self.description.unwrap_or_default(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    update_id: i64,
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: RawChat,
    from: Option<RawUser>,
    text: Option<String>,
    location: Option<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: i64,
    username: Option<String>,
    #[serde(default)]
    first_name: String,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

/// Only the id of a sent message is of interest.
#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Telegram Bot API client.
pub struct TelegramClient {
    http: reqwest::Client,
    /// `<api_url>/bot<token>`; never logged.
    base_url: String,
    poll_timeout: Duration,
    /// Next `getUpdates` offset.
    offset: AtomicI64,
}

impl TelegramClient {
    /// Create a client from its configuration.
    pub fn new(config: TelegramConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.token
            ),
            poll_timeout: config.poll_timeout,
            offset: AtomicI64::new(0),
        })
    }

    /// Register the command menu shown by chat clients.
    pub async fn set_my_commands(&self, commands: &[(&str, &str)]) -> Result<(), TransportError> {
        let commands: Vec<_> = commands
            .iter()
            .map(|(command, description)| json!({ "command": command, "description": description }))
            .collect();

        let _: bool = self
            .call("setMyCommands", &json!({ "commands": commands }), None)
            .await?;
        tracing::debug!(count = commands.len(), "Bot commands registered");
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TransportError> {
        let mut request = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Error replies come with a 4xx status and the usual JSON envelope
        let bytes = request.send().await?.bytes().await?;
        let response: ApiResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|e| TransportError::JsonError(format!("{}: {}", method, e)))?;

        response.into_result()
    }
}

impl ChatTransport for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<MessageHandle, TransportError> {
        let sent: SentMessage = self
            .call(
                "sendMessage",
                &json!({ "chat_id": chat.0, "text": text }),
                None,
            )
            .await?;
        Ok(MessageHandle(sent.message_id))
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        handle: MessageHandle,
        text: &str,
    ) -> Result<(), TransportError> {
        // Replies with the edited message or `true`
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({ "chat_id": chat.0, "message_id": handle.0, "text": text }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn send_live_location(
        &self,
        chat: ChatId,
        position: Coordinates,
        live_period: Duration,
    ) -> Result<MessageHandle, TransportError> {
        let sent: SentMessage = self
            .call(
                "sendLocation",
                &json!({
                    "chat_id": chat.0,
                    "latitude": position.latitude,
                    "longitude": position.longitude,
                    "live_period": live_period.as_secs(),
                }),
                None,
            )
            .await?;
        Ok(MessageHandle(sent.message_id))
    }

    async fn edit_live_location(
        &self,
        chat: ChatId,
        handle: MessageHandle,
        position: Coordinates,
    ) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "editMessageLiveLocation",
                &json!({
                    "chat_id": chat.0,
                    "message_id": handle.0,
                    "latitude": position.latitude,
                    "longitude": position.longitude,
                }),
                None,
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, handle: MessageHandle) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat.0, "message_id": handle.0 }),
                None,
            )
            .await?;
        Ok(())
    }
}

impl UpdateSource for TelegramClient {
    async fn next_updates(&self) -> Result<Vec<InboundMessage>, TransportError> {
        let offset = self.offset.load(Ordering::Acquire);
        let updates: Vec<RawUpdate> = self
            .call(
                "getUpdates",
                &json!({
                    "offset": offset,
                    "timeout": self.poll_timeout.as_secs(),
                    "allowed_updates": ["message"],
                }),
                Some(self.poll_timeout + POLL_GRACE),
            )
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::Release);
        }

        tracing::trace!(count = updates.len(), offset, "Updates received");
        Ok(updates.into_iter().filter_map(convert_update).collect())
    }
}

/// Keep text and location messages; everything else is ignored.
fn convert_update(update: RawUpdate) -> Option<InboundMessage> {
    let message = update.message?;

    let content = match (message.text, message.location) {
        (Some(text), _) => InboundContent::Text(text),
        (None, Some(loc)) => InboundContent::Location(Coordinates::new(loc.latitude, loc.longitude)),
        (None, None) => {
            tracing::trace!(
                update_id = update.update_id,
                message_id = message.message_id,
                "Ignoring message without text or location"
            );
            return None;
        }
    };

    Some(InboundMessage {
        chat: ChatId(message.chat.id),
        sender: message.from.map(|u| Sender {
            user_id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
        }),
        content,
    })
}
