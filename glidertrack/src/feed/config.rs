//! Configuration for the APRS-IS feed connection.

use std::time::Duration;

/// Default OGN APRS-IS server.
pub const DEFAULT_SERVER: &str = "aprs.glidernet.org";

/// Default port of the filtered APRS-IS feed.
pub const DEFAULT_PORT: u16 = 14580;

/// Default login callsign (receive-only).
pub const DEFAULT_CALLSIGN: &str = "N0CALL";

/// Passcode `-1` logs in read-only.
pub const DEFAULT_PASSCODE: &str = "-1";

/// Default wait between reconnect attempts after a connection failure.
pub const DEFAULT_RECONNECT_BACKOFF_SECS: u64 = 5;

/// Default keepalive period. APRS-IS servers drop clients idle for longer.
pub const DEFAULT_KEEPALIVE_SECS: u64 = 240;

/// Configuration for [`AprsClient`](super::AprsClient) and the ingestion loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// APRS-IS server host name.
    pub server: String,

    /// APRS-IS server port.
    pub port: u16,

    /// Login callsign.
    pub callsign: String,

    /// Login passcode.
    pub passcode: String,

    /// Wait between reconnect attempts after an error.
    pub reconnect_backoff: Duration,

    /// Interval between keepalive comments sent to the server.
    pub keepalive: Duration,
}

impl FeedConfig {
    /// `host:port` of the server.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            callsign: DEFAULT_CALLSIGN.to_string(),
            passcode: DEFAULT_PASSCODE.to_string(),
            reconnect_backoff: Duration::from_secs(DEFAULT_RECONNECT_BACKOFF_SECS),
            keepalive: Duration::from_secs(DEFAULT_KEEPALIVE_SECS),
        }
    }
}
