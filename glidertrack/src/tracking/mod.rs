//! Tracking state shared by commands, ingestion and broadcasting.
//!
//! The [`TrackingStore`] is the single source of truth for which gliders are
//! tracked, what was last heard from them, and which chat messages currently
//! represent them. Everything else in the crate either mutates it (commands,
//! feed ingestion) or reads consistent snapshots of it (the broadcaster).
//!
//! # Components
//!
//! - `entry` - `Beacon`, `OutboundHandles`, `TrackedEntry`
//! - `store` - `TrackingStore` and its outcome types

mod entry;
mod store;

pub use entry::{Beacon, OutboundHandles, TrackedEntry};
pub use store::{
    AddOutcome, EnableOutcome, ResetOutcome, Snapshot, StoreSummary, TrackingStore,
};
