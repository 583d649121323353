//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_LIVE_PERIOD_SECS, MIN_LIVE_PERIOD_SECS};
use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::broadcast::HandlePolicy;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [telegram] section
    if let Some(section) = ini.section(Some("telegram")) {
        if let Some(v) = section.get("token") {
            let v = v.trim();
            if !v.is_empty() {
                config.telegram.token = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("api_url") {
            let v = v.trim().trim_end_matches('/');
            if !v.is_empty() {
                config.telegram.api_url = v.to_string();
            }
        }
        if let Some(v) = section.get("poll_timeout") {
            config.telegram.poll_timeout = parse_seconds("telegram", "poll_timeout", v)?;
        }
    }

    // [feed] section
    if let Some(section) = ini.section(Some("feed")) {
        if let Some(v) = section.get("server") {
            let v = v.trim();
            if !v.is_empty() {
                config.feed.server = v.to_string();
            }
        }
        if let Some(v) = section.get("port") {
            config.feed.port = match v.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(invalid("feed", "port", v, "must be a port number (1-65535)")),
            };
        }
        if let Some(v) = section.get("callsign") {
            let v = v.trim();
            if !v.is_empty() {
                config.feed.callsign = v.to_string();
            }
        }
        if let Some(v) = section.get("passcode") {
            let v = v.trim();
            if !v.is_empty() {
                config.feed.passcode = v.to_string();
            }
        }
        if let Some(v) = section.get("reconnect_backoff") {
            config.feed.reconnect_backoff = parse_seconds("feed", "reconnect_backoff", v)?;
        }
        if let Some(v) = section.get("keepalive") {
            config.feed.keepalive = parse_seconds("feed", "keepalive", v)?;
        }
    }

    // [broadcast] section
    if let Some(section) = ini.section(Some("broadcast")) {
        if let Some(v) = section.get("interval") {
            config.broadcast.interval = parse_seconds("broadcast", "interval", v)?;
        }
        if let Some(v) = section.get("live_period") {
            let secs = parse_seconds("broadcast", "live_period", v)?;
            if !(MIN_LIVE_PERIOD_SECS..=MAX_LIVE_PERIOD_SECS).contains(&secs) {
                return Err(invalid(
                    "broadcast",
                    "live_period",
                    v,
                    &format!(
                        "must be between {} and {} seconds",
                        MIN_LIVE_PERIOD_SECS, MAX_LIVE_PERIOD_SECS
                    ),
                ));
            }
            config.broadcast.live_period = secs;
        }
        if let Some(v) = section.get("policy") {
            config.broadcast.policy = HandlePolicy::from_str(v)
                .map_err(|reason| invalid("broadcast", "policy", v, &reason))?;
        }
    }

    // [landing] section
    if let Some(section) = ini.section(Some("landing")) {
        if let Some(v) = section.get("capture_window") {
            config.landing.capture_window = parse_seconds("landing", "capture_window", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a positive number of seconds.
pub(super) fn parse_seconds(section: &str, key: &str, value: &str) -> Result<u64, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(section, key, value, "must be a positive number of seconds")),
    }
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(contents: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, contents).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[feed]
callsign = D-KXYZ
port = 10152

[broadcast]
policy = replace
"#,
        )
        .unwrap();

        assert_eq!(config.feed.callsign, "D-KXYZ");
        assert_eq!(config.feed.port, 10152);
        assert_eq!(config.feed.server, DEFAULT_SERVER);
        assert_eq!(config.broadcast.policy, HandlePolicy::Replace);
        assert_eq!(config.broadcast.interval, DEFAULT_BROADCAST_INTERVAL_SECS);
    }

    #[test]
    fn test_empty_token_stays_unset() {
        let config = load("[telegram]\ntoken =\n").unwrap();
        assert!(config.telegram.token.is_none());
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = load("[telegram]\napi_url = http://localhost:8081/\n").unwrap();
        assert_eq!(config.telegram.api_url, "http://localhost:8081");
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = load("[broadcast]\ninterval = 0\n").unwrap_err();
        assert!(err.to_string().contains("broadcast.interval"));
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load("[feed]\nport = 70000\n").unwrap_err();
        assert!(err.to_string().contains("feed.port"));
    }

    #[test]
    fn test_live_period_range() {
        let err = load("[broadcast]\nlive_period = 30\n").unwrap_err();
        assert!(err.to_string().contains("between 60 and 86400"));

        let config = load("[broadcast]\nlive_period = 3600\n").unwrap();
        assert_eq!(config.broadcast.live_period, 3600);
    }

    #[test]
    fn test_invalid_policy() {
        let err = load("[broadcast]\npolicy = append\n").unwrap_err();
        assert!(err.to_string().contains("expected 'edit' or 'replace'"));
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/test/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("test/path"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_to_tracker_config() {
        let config = load("[broadcast]\ninterval = 10\n[landing]\ncapture_window = 60\n").unwrap();
        let tracker = config.to_tracker_config();

        assert_eq!(tracker.broadcast.interval, std::time::Duration::from_secs(10));
        assert_eq!(
            tracker.landing_capture_window,
            std::time::Duration::from_secs(60)
        );
        assert_eq!(
            tracker.reconnect_backoff,
            std::time::Duration::from_secs(DEFAULT_RECONNECT_BACKOFF_SECS)
        );
    }
}
