//! Detail text shown next to each live location marker.

use chrono::{DateTime, Utc};

use crate::coord::Coordinates;
use crate::tracking::TrackedEntry;

/// Timestamp layout of the "Last update" line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Compose the detail text for one entry.
///
/// ```text
/// Address: DEF123
/// Glider1 (alice)
/// Altitude: 1684 m
/// Last update: 2024-05-01 12:00:00 (45s ago)
/// Distance to landing: 72.2 km
/// ```
///
/// Lines other than the address are omitted when their data is missing.
pub fn compose_detail_text(
    entry: &TrackedEntry,
    landing: Option<Coordinates>,
    now: DateTime<Utc>,
) -> String {
    let mut lines = vec![format!("Address: {}", entry.id)];

    if let Some(label) = entry.label() {
        lines.push(label);
    }

    if let Some(altitude) = entry.last_position.as_ref().and_then(|b| b.altitude_m) {
        lines.push(format!("Altitude: {:.0} m", altitude));
    }

    if let Some(updated) = entry.last_update {
        lines.push(format!(
            "Last update: {} ({} ago)",
            updated.format(TIMESTAMP_FORMAT),
            format_elapsed(now.signed_duration_since(updated))
        ));
    }

    if let (Some(landing), Some(beacon)) = (landing, entry.last_position.as_ref()) {
        lines.push(format!(
            "Distance to landing: {:.1} km",
            beacon.position.distance_km(&landing)
        ));
    }

    lines.join("\n")
}

/// Compact elapsed time: `45s`, `3m 12s`, `2h 05m`, `1d 3h`.
///
/// Negative durations (clock skew) read as `0s`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{}s", s),
        s if s < 3600 => format!("{}m {}s", s / 60, s % 60),
        s if s < 86_400 => format!("{}h {:02}m", s / 3600, (s % 3600) / 60),
        s => format!("{}d {}h", s / 86_400, (s % 86_400) / 3600),
    }
}
