//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let token = config.telegram.token.as_deref().unwrap_or("");

    format!(
        r#"[telegram]
; Bot token from @BotFather. The TELEGRAM_BOT_TOKEN environment variable
; takes precedence over this value.
token = {}
; Bot API base URL (change only for a self-hosted Bot API server)
api_url = {}
; Long-poll timeout for getUpdates, in seconds
poll_timeout = {}

[feed]
; APRS-IS server of the Open Glider Network
server = {}
port = {}
; Login callsign and passcode. Passcode -1 logs in read-only.
callsign = {}
passcode = {}
; Seconds to wait before reconnecting after a dropped connection
reconnect_backoff = {}
; Seconds between keepalive comments sent to the server
keepalive = {}

[broadcast]
; Seconds between position broadcasts
interval = {}
; Live period of location markers in seconds (60-86400)
live_period = {}
; How existing messages are refreshed:
;   edit    - edit the live marker and detail text in place
;   replace - delete and re-send both messages every cycle
policy = {}

[landing]
; Seconds /landing waits for a location message
capture_window = {}

[logging]
; Log file (cleared on every start)
file = {}
"#,
        token,
        config.telegram.api_url,
        config.telegram.poll_timeout,
        config.feed.server,
        config.feed.port,
        config.feed.callsign,
        config.feed.passcode,
        config.feed.reconnect_backoff,
        config.feed.keepalive,
        config.broadcast.interval,
        config.broadcast.live_period,
        config.broadcast.policy,
        config.landing.capture_window,
        path_to_string(&config.logging.file),
    )
}

/// Render a path with the home directory collapsed to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[telegram]", "[feed]", "[broadcast]", "[landing]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("token = \n"));
        assert!(content.contains("policy = edit"));
    }
}
