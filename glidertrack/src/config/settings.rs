//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file. The
//! `to_*` helpers turn them into the runtime configs the components take.

use std::path::PathBuf;
use std::time::Duration;

use crate::broadcast::{BroadcastConfig, HandlePolicy};
use crate::chat::TelegramConfig;
use crate::feed::FeedConfig;
use crate::tracker::TrackerConfig;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Telegram Bot API settings
    pub telegram: TelegramSettings,
    /// APRS-IS feed settings
    pub feed: FeedSettings,
    /// Broadcast cycle settings
    pub broadcast: BroadcastSettings,
    /// Landing capture settings
    pub landing: LandingSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Telegram configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramSettings {
    /// Bot token; the `TELEGRAM_BOT_TOKEN` environment variable takes precedence.
    pub token: Option<String>,
    /// Bot API base URL
    pub api_url: String,
    /// Long-poll timeout in seconds
    pub poll_timeout: u64,
}

/// Feed configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub server: String,
    pub port: u16,
    pub callsign: String,
    pub passcode: String,
    /// Seconds between reconnect attempts
    pub reconnect_backoff: u64,
    /// Seconds between keepalive comments
    pub keepalive: u64,
}

/// Broadcast configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastSettings {
    /// Seconds between broadcast ticks
    pub interval: u64,
    /// Live period of location markers in seconds
    pub live_period: u64,
    /// How existing messages are refreshed
    pub policy: HandlePolicy,
}

/// Landing capture configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingSettings {
    /// Seconds `/landing` waits for a location
    pub capture_window: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl TelegramSettings {
    /// Runtime config for the Telegram client using the given token.
    pub fn to_telegram_config(&self, token: String) -> TelegramConfig {
        TelegramConfig {
            token,
            api_url: self.api_url.clone(),
            poll_timeout: Duration::from_secs(self.poll_timeout),
        }
    }
}

impl FeedSettings {
    pub fn to_feed_config(&self) -> FeedConfig {
        FeedConfig {
            server: self.server.clone(),
            port: self.port,
            callsign: self.callsign.clone(),
            passcode: self.passcode.clone(),
            reconnect_backoff: Duration::from_secs(self.reconnect_backoff),
            keepalive: Duration::from_secs(self.keepalive),
        }
    }
}

impl ConfigFile {
    /// Runtime config for the tracker and its background tasks.
    pub fn to_tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            broadcast: BroadcastConfig {
                interval: Duration::from_secs(self.broadcast.interval),
                live_period: Duration::from_secs(self.broadcast.live_period),
                policy: self.broadcast.policy,
            },
            reconnect_backoff: Duration::from_secs(self.feed.reconnect_backoff),
            landing_capture_window: Duration::from_secs(self.landing.capture_window),
        }
    }
}
