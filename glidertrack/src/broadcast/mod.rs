//! Periodic broadcast of tracked positions to the chat.
//!
//! Every tick the [`BroadcastCycle`] snapshots the tracking store and, for
//! each entry with a known position, creates or refreshes a pair of chat
//! messages: a live location marker and a detail text (see [`render`]).
//!
//! # Handle lifecycle
//!
//! ```text
//!   Absent ──create──► Editable ──live period elapsed / not editable──► Stale
//!                         ▲                                              │
//!                         └──────────────── delete + create ─────────────┘
//! ```
//!
//! With [`HandlePolicy::Replace`] every existing pair is treated as stale, so
//! each tick deletes and re-sends the messages.

mod cycle;
pub mod render;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

pub use cycle::{BroadcastCycle, CycleReport};

use crate::tracking::OutboundHandles;

/// Default tick period.
pub const DEFAULT_BROADCAST_INTERVAL_SECS: u64 = 30;

/// Default live period of location markers (24 hours, the Bot API maximum).
pub const DEFAULT_LIVE_PERIOD_SECS: u64 = 86_400;

/// How existing messages are refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlePolicy {
    /// Edit the existing pair in place.
    #[default]
    Edit,
    /// Delete the existing pair and send a new one.
    Replace,
}

impl fmt::Display for HandlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlePolicy::Edit => write!(f, "edit"),
            HandlePolicy::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for HandlePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "edit" => Ok(HandlePolicy::Edit),
            "replace" => Ok(HandlePolicy::Replace),
            other => Err(format!("expected 'edit' or 'replace', got '{}'", other)),
        }
    }
}

/// Configuration for the broadcast cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastConfig {
    /// Tick period.
    pub interval: Duration,
    /// Live period requested for new location markers.
    pub live_period: Duration,
    /// Refresh policy for existing messages.
    pub policy: HandlePolicy,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_BROADCAST_INTERVAL_SECS),
            live_period: Duration::from_secs(DEFAULT_LIVE_PERIOD_SECS),
            policy: HandlePolicy::default(),
        }
    }
}

/// What the broadcaster should do with an entry's existing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Nothing sent yet.
    Absent,
    /// The pair can be edited in place.
    Editable(OutboundHandles),
    /// The pair must be deleted and re-sent.
    Stale(OutboundHandles),
}

impl HandleState {
    /// Classify an entry's handles at `now` under `policy`.
    pub fn classify(outbound: Option<OutboundHandles>, policy: HandlePolicy, now: Instant) -> Self {
        match outbound {
            None => HandleState::Absent,
            Some(handles) if policy == HandlePolicy::Replace || handles.is_stale(now) => {
                HandleState::Stale(handles)
            }
            Some(handles) => HandleState::Editable(handles),
        }
    }
}
