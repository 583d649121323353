//! Tracking store - the single source of truth for tracked gliders.
//!
//! One [`TrackingStore`] exists per process. Command handling, feed ingestion
//! and the broadcaster all share it through an `Arc`, and every operation is
//! serialized by one mutex. The lock is only ever held for in-memory work:
//! callers that need to perform I/O take a [`Snapshot`] first and write
//! results back with [`TrackingStore::record_outbound_handles`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::entry::{Beacon, OutboundHandles, TrackedEntry};
use crate::chat::ChatId;
use crate::coord::Coordinates;
use crate::ident::normalize;

/// Result of a request to change the tracking flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// Tracking switched from off to on.
    Enabled,
    /// Tracking was already on.
    AlreadyEnabled,
    /// Enable rejected: nothing is tracked.
    NoEntries,
    /// Tracking switched from on to off.
    Disabled,
    /// Tracking was already off.
    AlreadyDisabled,
}

/// Result of a session reset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResetOutcome {
    /// Tracking was on and has been forced off; the feed must be released.
    pub tracking_was_enabled: bool,
    /// Number of entries dropped by the reset.
    pub cleared: usize,
    /// Message pairs of the dropped entries, left for the caller to delete.
    pub retired: Vec<OutboundHandles>,
}

/// Result of adding an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Canonical form of the identifier.
    pub id: String,
    /// False when an existing entry had its labels updated.
    pub inserted: bool,
}

/// Independent copy of the state the broadcaster needs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Entries sorted by id.
    pub entries: Vec<TrackedEntry>,
    /// Where outward messages go.
    pub chat_target: Option<ChatId>,
    /// Reference point for distance lines.
    pub landing: Option<Coordinates>,
}

/// Counters reported by `/status` and `/list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSummary {
    pub tracking_enabled: bool,
    pub session_active: bool,
    pub landing: Option<Coordinates>,
    /// `(id, label)` pairs sorted by id.
    pub entries: Vec<(String, Option<String>)>,
}

#[derive(Debug, Default)]
struct LandingCapture {
    reference: Option<Coordinates>,
    deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct SessionState {
    entries: HashMap<String, TrackedEntry>,
    tracking_enabled: bool,
    session_active: bool,
    chat_target: Option<ChatId>,
    landing: LandingCapture,
}

/// Mutex-guarded tracking session.
#[derive(Debug, Default)]
pub struct TrackingStore {
    state: Mutex<SessionState>,
}

impl TrackingStore {
    /// Create an empty, disabled store with no active session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an identifier, or update the labels of an existing entry.
    ///
    /// Position and outbound handles of an existing entry are left untouched.
    pub fn add(
        &self,
        raw_id: &str,
        display_name: Option<String>,
        attribution_name: Option<String>,
    ) -> AddOutcome {
        let id = normalize(raw_id);
        let mut state = self.state.lock();

        let inserted = match state.entries.get_mut(&id) {
            Some(entry) => {
                entry.display_name = display_name;
                entry.attribution_name = attribution_name;
                false
            }
            None => {
                state.entries.insert(
                    id.clone(),
                    TrackedEntry::new(id.clone(), display_name, attribution_name),
                );
                true
            }
        };

        tracing::debug!(id = %id, inserted, total = state.entries.len(), "Tracked id added");
        AddOutcome { id, inserted }
    }

    /// Stop tracking an identifier. Returns the canonical id and whether an
    /// entry existed; removing an absent id is not an error.
    pub fn remove(&self, raw_id: &str) -> (String, bool) {
        let (id, entry) = self.remove_entry(raw_id);
        (id, entry.is_some())
    }

    /// Stop tracking an identifier and hand back the dropped entry.
    pub fn remove_entry(&self, raw_id: &str) -> (String, Option<TrackedEntry>) {
        let id = normalize(raw_id);
        let entry = self.state.lock().entries.remove(&id);
        tracing::debug!(id = %id, removed = entry.is_some(), "Tracked id removed");
        (id, entry)
    }

    /// Fold a beacon into the matching entry, stamped with the current time.
    pub fn fold_beacon(&self, raw_id: &str, beacon: Beacon) -> bool {
        self.fold_beacon_at(raw_id, beacon, Utc::now())
    }

    /// Fold a beacon into the matching entry.
    ///
    /// Beacons for ids that are not tracked are dropped. Returns true if the
    /// beacon was folded.
    pub fn fold_beacon_at(&self, raw_id: &str, beacon: Beacon, now: DateTime<Utc>) -> bool {
        let id = normalize(raw_id);
        let mut state = self.state.lock();

        match state.entries.get_mut(&id) {
            Some(entry) => {
                tracing::debug!(
                    id = %id,
                    source = %beacon.source_id,
                    lat = format!("{:.5}", beacon.position.latitude),
                    lon = format!("{:.5}", beacon.position.longitude),
                    "Beacon folded"
                );
                entry.last_position = Some(beacon);
                entry.last_update = Some(now);
                true
            }
            None => {
                tracing::trace!(source = %raw_id, "Ignoring beacon for untracked id");
                false
            }
        }
    }

    /// Switch tracking on or off.
    ///
    /// Enabling is refused while no entries are tracked. The caller is
    /// responsible for starting or stopping the background tasks according
    /// to the outcome.
    pub fn set_enabled(&self, enabled: bool) -> EnableOutcome {
        let mut state = self.state.lock();
        match (enabled, state.tracking_enabled) {
            (true, true) => EnableOutcome::AlreadyEnabled,
            (true, false) if state.entries.is_empty() => EnableOutcome::NoEntries,
            (true, false) => {
                state.tracking_enabled = true;
                EnableOutcome::Enabled
            }
            (false, true) => {
                state.tracking_enabled = false;
                EnableOutcome::Disabled
            }
            (false, false) => EnableOutcome::AlreadyDisabled,
        }
    }

    /// Returns true while tracking is on.
    pub fn is_enabled(&self) -> bool {
        self.state.lock().tracking_enabled
    }

    /// Start a session, discarding the previous one if it was active.
    ///
    /// Resetting an active session clears all entries and forces tracking
    /// off. The outcome tells the caller whether the feed must be released.
    pub fn reset_session(&self) -> ResetOutcome {
        let mut state = self.state.lock();
        let mut outcome = ResetOutcome::default();

        if state.session_active {
            outcome.cleared = state.entries.len();
            outcome.retired = state
                .entries
                .drain()
                .filter_map(|(_, entry)| entry.outbound)
                .collect();
            if state.tracking_enabled {
                state.tracking_enabled = false;
                outcome.tracking_was_enabled = true;
            }
        }
        state.session_active = true;

        tracing::info!(
            cleared = outcome.cleared,
            tracking_was_enabled = outcome.tracking_was_enabled,
            "Session started"
        );
        outcome
    }

    /// Mark the session inactive. Entries and tracking state are kept.
    pub fn end_session(&self) {
        self.state.lock().session_active = false;
    }

    /// Returns true once a session has been started.
    pub fn is_session_active(&self) -> bool {
        self.state.lock().session_active
    }

    /// Copy everything the broadcaster needs without keeping the lock.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        let mut entries: Vec<TrackedEntry> = state.entries.values().cloned().collect();
        let chat_target = state.chat_target;
        let landing = state.landing.reference;
        drop(state);

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Snapshot {
            entries,
            chat_target,
            landing,
        }
    }

    /// Write back the messages emitted for an entry.
    ///
    /// Dropped silently if the entry was removed while the broadcaster was
    /// talking to the transport.
    pub fn record_outbound_handles(&self, raw_id: &str, handles: Option<OutboundHandles>) {
        let id = normalize(raw_id);
        let mut state = self.state.lock();
        match state.entries.get_mut(&id) {
            Some(entry) => entry.outbound = handles,
            None => tracing::trace!(id = %id, "Entry gone before handles were recorded"),
        }
    }

    /// Set the chat that receives outward messages.
    pub fn set_chat_target(&self, chat: ChatId) {
        self.state.lock().chat_target = Some(chat);
    }

    /// Chat that receives outward messages, if one is known.
    pub fn chat_target(&self) -> Option<ChatId> {
        self.state.lock().chat_target
    }

    /// Start accepting a landing location until `now + window`.
    pub fn arm_landing_capture(&self, now: Instant, window: Duration) {
        self.state.lock().landing.deadline = Some(now + window);
    }

    /// Stop accepting a landing location.
    pub fn disarm_landing_capture(&self) {
        self.state.lock().landing.deadline = None;
    }

    /// Returns true if a location received at `now` would be accepted.
    #[cfg(test)]
    fn is_capturing_landing(&self, now: Instant) -> bool {
        matches!(self.state.lock().landing.deadline, Some(deadline) if now < deadline)
    }

    /// Offer a location for the landing reference.
    ///
    /// Accepted only while capture is armed and the deadline has not passed;
    /// acceptance disarms capture. A late location is ignored.
    pub fn offer_landing_location(&self, location: Coordinates, now: Instant) -> bool {
        let mut state = self.state.lock();
        match state.landing.deadline {
            Some(deadline) if now < deadline => {
                state.landing.reference = Some(location);
                state.landing.deadline = None;
                tracing::info!(landing = %location, "Landing reference set");
                true
            }
            _ => false,
        }
    }

    /// Current landing reference.
    pub fn landing_reference(&self) -> Option<Coordinates> {
        self.state.lock().landing.reference
    }

    /// Canonical ids currently tracked, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.lock().entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Look up a single entry by raw or canonical id.
    pub fn entry(&self, raw_id: &str) -> Option<TrackedEntry> {
        self.state.lock().entries.get(&normalize(raw_id)).cloned()
    }

    /// Counters and labels for status replies.
    pub fn summary(&self) -> StoreSummary {
        let state = self.state.lock();
        let mut entries: Vec<(String, Option<String>)> = state
            .entries
            .values()
            .map(|e| (e.id.clone(), e.label()))
            .collect();
        let summary_flags = (
            state.tracking_enabled,
            state.session_active,
            state.landing.reference,
        );
        drop(state);

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        StoreSummary {
            tracking_enabled: summary_flags.0,
            session_active: summary_flags.1,
            landing: summary_flags.2,
            entries,
        }
    }
}
