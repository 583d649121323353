//! Position feed: connection, decoding, subscription and ingestion.
//!
//! # Architecture
//!
//! ```text
//! SubscriptionManager ──filter/disconnect──► FeedClient (AprsClient)
//!                                                │ lines
//!                                                ▼
//!                 IngestionLoop ──► BeaconDecoder (AprsDecoder)
//!                       │
//!                       └── TrackingStore::fold_beacon()
//! ```
//!
//! The ingestion loop runs only while tracking is enabled. Filter changes
//! while it runs are applied by disconnecting; the loop reconnects at once
//! with the new filter.

mod client;
mod config;
mod error;
mod ingest;
mod parser;
mod subscription;

pub use client::{login_line, AprsClient, FeedClient};
pub use config::{
    FeedConfig, DEFAULT_CALLSIGN, DEFAULT_KEEPALIVE_SECS, DEFAULT_PASSCODE, DEFAULT_PORT,
    DEFAULT_RECONNECT_BACKOFF_SECS, DEFAULT_SERVER,
};
pub use error::{DecodeError, FeedError};
pub use ingest::{ingest_line, IngestionLoop};
pub use parser::{AprsDecoder, BeaconDecoder};
pub use subscription::{build_filter, SubscriptionManager, BUDDY_FILTER_PREFIX};
