//! Command dispatcher: turns inbound chat messages into tracker operations
//! and acknowledges each one.

use std::sync::Arc;
use std::time::Duration;

use super::command::{help_text, Command};
use crate::chat::{ChatId, ChatTransport, InboundContent, InboundMessage, Sender};
use crate::feed::{BeaconDecoder, FeedClient};
use crate::tracker::Tracker;
use crate::tracking::EnableOutcome;

/// Reply to `/start`.
pub const WELCOME_TEXT: &str =
    "This bot tracks gliders on the OGN network. After /start, run /start_session to enable commands.";

/// Reply to `/start_session`.
pub const SESSION_STARTED_TEXT: &str = "Session started. You can now use all commands.";

/// Reply to an accepted landing location.
pub const LANDING_SAVED_TEXT: &str = "Landing location saved";

/// Decides whether a sender may issue commands.
pub type TrustPredicate = Box<dyn Fn(Option<&Sender>) -> bool + Send + Sync>;

fn trust_everyone(_sender: Option<&Sender>) -> bool {
    true
}

/// Acknowledgment for a change of the tracking flag.
pub fn enable_ack(outcome: EnableOutcome) -> &'static str {
    match outcome {
        EnableOutcome::Enabled => "Tracking enabled",
        EnableOutcome::AlreadyEnabled => "Tracking already enabled",
        EnableOutcome::NoEntries => "No addresses added",
        EnableOutcome::Disabled => "Tracking disabled",
        EnableOutcome::AlreadyDisabled => "Tracking already disabled",
    }
}

/// Routes inbound messages to the [`Tracker`].
pub struct CommandDispatcher<F, D, T>
where
    F: FeedClient,
    D: BeaconDecoder,
    T: ChatTransport,
{
    tracker: Arc<Tracker<F, D, T>>,
    trust: TrustPredicate,
}

impl<F, D, T> CommandDispatcher<F, D, T>
where
    F: FeedClient + 'static,
    D: BeaconDecoder + 'static,
    T: ChatTransport + 'static,
{
    /// Create a dispatcher that trusts every sender.
    pub fn new(tracker: Arc<Tracker<F, D, T>>) -> Self {
        Self::with_trust(tracker, Box::new(trust_everyone))
    }

    /// Create a dispatcher with a custom trust predicate.
    pub fn with_trust(tracker: Arc<Tracker<F, D, T>>, trust: TrustPredicate) -> Self {
        Self { tracker, trust }
    }

    pub fn tracker(&self) -> &Arc<Tracker<F, D, T>> {
        &self.tracker
    }

    /// Handle one inbound message. Returns the reply that was sent, if any.
    pub async fn handle(&self, message: InboundMessage) -> Option<String> {
        if !(self.trust)(message.sender.as_ref()) {
            tracing::debug!(
                chat = %message.chat,
                user = ?message.sender.as_ref().map(|s| s.user_id),
                "Ignoring message from untrusted sender"
            );
            return None;
        }

        let reply = match message.content {
            InboundContent::Location(location) => {
                if self.tracker.offer_landing_location(location) {
                    LANDING_SAVED_TEXT.to_string()
                } else {
                    tracing::debug!(location = %location, "Location outside capture window ignored");
                    return None;
                }
            }
            InboundContent::Text(text) => match Command::parse(&text) {
                Ok(None) => return None,
                Ok(Some(command)) => {
                    if command != Command::Landing {
                        self.tracker.disarm_landing_capture();
                    }
                    self.execute(command, message.chat, message.sender.as_ref())
                }
                Err(usage) => {
                    self.tracker.disarm_landing_capture();
                    usage.to_string()
                }
            },
        };

        if let Err(e) = self
            .tracker
            .transport()
            .send_text(message.chat, &reply)
            .await
        {
            tracing::warn!(chat = %message.chat, error = %e, "Failed to send reply");
        }
        Some(reply)
    }

    /// Apply a command and build its acknowledgment.
    fn execute(&self, command: Command, chat: ChatId, sender: Option<&Sender>) -> String {
        tracing::debug!(chat = %chat, command = ?command, "Command received");
        let tracker = &self.tracker;

        match command {
            Command::Start => {
                tracker.end_session(chat);
                WELCOME_TEXT.to_string()
            }
            Command::StartSession => {
                tracker.reset_session(chat);
                SESSION_STARTED_TEXT.to_string()
            }
            Command::Add { id, name } => {
                tracker.set_chat_target(chat);
                let attribution = sender.and_then(Sender::attribution_name);
                let outcome = tracker.add(&id, name, attribution);
                format!("Added {}", outcome.id)
            }
            Command::Remove { id } => {
                tracker.set_chat_target(chat);
                match tracker.remove(&id) {
                    (id, true) => format!("Removed {}", id),
                    (id, false) => format!("{} was not tracked", id),
                }
            }
            Command::TrackOn => enable_ack(tracker.enable(chat)).to_string(),
            Command::TrackOff => enable_ack(tracker.disable()).to_string(),
            Command::List => self.list_text(),
            Command::Status => {
                let summary = tracker.store().summary();
                format!(
                    "Tracking {}. {} address(es) added.",
                    if summary.tracking_enabled { "enabled" } else { "disabled" },
                    summary.entries.len()
                )
            }
            Command::Landing => {
                let window = tracker.arm_landing_capture(chat);
                format!("Send landing location within {}", describe_window(window))
            }
            Command::Help => help_text(),
        }
    }

    fn list_text(&self) -> String {
        let summary = self.tracker.store().summary();
        let mut lines = vec![format!(
            "Tracking: {}",
            if summary.tracking_enabled { "on" } else { "off" }
        )];

        if summary.entries.is_empty() {
            lines.push("none".to_string());
        }
        for (id, label) in summary.entries {
            match label {
                Some(label) => lines.push(format!("{} - {}", id, label)),
                None => lines.push(id),
            }
        }
        if let Some(landing) = summary.landing {
            lines.push(format!("Landing: {}", landing));
        }

        lines.join("\n")
    }
}

/// `2 minutes`, `1 minute`, or `45 seconds`.
fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s >= 60 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}
