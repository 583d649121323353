//! Default values for all configuration settings.
//!
//! Component defaults are owned by the components themselves; this module
//! re-exports them under one roof and implements `ConfigFile::default()`.

use super::file::config_directory;
use super::settings::*;
use crate::broadcast::HandlePolicy;

pub use crate::broadcast::{DEFAULT_BROADCAST_INTERVAL_SECS, DEFAULT_LIVE_PERIOD_SECS};
pub use crate::chat::{DEFAULT_API_URL, DEFAULT_POLL_TIMEOUT_SECS};
pub use crate::feed::{
    DEFAULT_CALLSIGN, DEFAULT_KEEPALIVE_SECS, DEFAULT_PASSCODE, DEFAULT_PORT,
    DEFAULT_RECONNECT_BACKOFF_SECS, DEFAULT_SERVER,
};
pub use crate::logging::DEFAULT_LOG_FILE;
pub use crate::tracker::DEFAULT_LANDING_CAPTURE_SECS;

/// Environment variable that overrides `[telegram] token`.
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Shortest live period the Bot API accepts.
pub const MIN_LIVE_PERIOD_SECS: u64 = 60;

/// Longest live period the Bot API accepts.
pub const MAX_LIVE_PERIOD_SECS: u64 = 86_400;

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            telegram: TelegramSettings {
                token: None,
                api_url: DEFAULT_API_URL.to_string(),
                poll_timeout: DEFAULT_POLL_TIMEOUT_SECS,
            },
            feed: FeedSettings {
                server: DEFAULT_SERVER.to_string(),
                port: DEFAULT_PORT,
                callsign: DEFAULT_CALLSIGN.to_string(),
                passcode: DEFAULT_PASSCODE.to_string(),
                reconnect_backoff: DEFAULT_RECONNECT_BACKOFF_SECS,
                keepalive: DEFAULT_KEEPALIVE_SECS,
            },
            broadcast: BroadcastSettings {
                interval: DEFAULT_BROADCAST_INTERVAL_SECS,
                live_period: DEFAULT_LIVE_PERIOD_SECS,
                policy: HandlePolicy::Edit,
            },
            landing: LandingSettings {
                capture_window: DEFAULT_LANDING_CAPTURE_SECS,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE),
            },
        }
    }
}
