//! Per-identifier tracking types.
//!
//! - [`Beacon`] - A decoded position report from the feed
//! - [`OutboundHandles`] - Messages previously emitted for an entry
//! - [`TrackedEntry`] - Everything the store knows about one tracked id

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::chat::MessageHandle;
use crate::coord::Coordinates;

/// A decoded position report.
#[derive(Debug, Clone, PartialEq)]
pub struct Beacon {
    /// Source identifier exactly as it appeared on the feed (e.g. `FLRDDA5BA`).
    pub source_id: String,
    /// Reported position.
    pub position: Coordinates,
    /// Altitude above mean sea level in meters, when reported.
    pub altitude_m: Option<f64>,
    /// Course over ground in degrees, when reported.
    pub course_deg: Option<u16>,
    /// Ground speed in km/h, when reported.
    pub ground_speed_kmh: Option<f64>,
    /// When the line was decoded.
    pub decoded_at: DateTime<Utc>,
}

impl Beacon {
    /// Create a beacon carrying only a position, decoded now.
    pub fn new(source_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            source_id: source_id.into(),
            position: Coordinates::new(latitude, longitude),
            altitude_m: None,
            course_deg: None,
            ground_speed_kmh: None,
            decoded_at: Utc::now(),
        }
    }

    /// Attach an altitude in meters.
    pub fn with_altitude(mut self, altitude_m: f64) -> Self {
        self.altitude_m = Some(altitude_m);
        self
    }
}

/// Messages previously emitted for one tracked entry.
///
/// The live marker is the anchor of the pair: without it there is nothing
/// to edit, so it is not optional. The detail text may be missing when its
/// send failed after the marker went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundHandles {
    /// Live location marker.
    pub live: MessageHandle,
    /// Companion text message.
    pub detail: Option<MessageHandle>,
    /// After this instant the live marker can no longer be edited.
    pub editable_until: Instant,
}

impl OutboundHandles {
    /// Create handles for a freshly sent pair.
    pub fn new(live: MessageHandle, detail: Option<MessageHandle>, editable_until: Instant) -> Self {
        Self {
            live,
            detail,
            editable_until,
        }
    }

    /// Returns true if the live marker can no longer be edited at `now`.
    pub fn is_stale(&self, now: Instant) -> bool {
        now >= self.editable_until
    }

    /// Mark the pair stale so the next broadcast replaces it.
    pub fn into_stale(self, now: Instant) -> Self {
        Self {
            editable_until: now,
            ..self
        }
    }
}

/// State for one tracked identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntry {
    /// Canonical identifier (see [`crate::ident::normalize`]).
    pub id: String,
    /// Optional label given with `/add`.
    pub display_name: Option<String>,
    /// Who added the entry.
    pub attribution_name: Option<String>,
    /// Last beacon folded for this id.
    pub last_position: Option<Beacon>,
    /// When the last beacon was folded.
    pub last_update: Option<DateTime<Utc>>,
    /// Messages emitted by the broadcaster.
    pub outbound: Option<OutboundHandles>,
}

impl TrackedEntry {
    /// Create an entry with no position and no outbound messages.
    pub fn new(
        id: String,
        display_name: Option<String>,
        attribution_name: Option<String>,
    ) -> Self {
        Self {
            id,
            display_name,
            attribution_name,
            last_position: None,
            last_update: None,
            outbound: None,
        }
    }

    /// Human label combining name and attribution, if either is set.
    ///
    /// `Glider1 (alice)`, `Glider1`, or `alice`.
    pub fn label(&self) -> Option<String> {
        match (&self.display_name, &self.attribution_name) {
            (Some(name), Some(by)) => Some(format!("{} ({})", name, by)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(by)) => Some(by.clone()),
            (None, None) => None,
        }
    }
}
