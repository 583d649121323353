//! glidertrack - relay live Open Glider Network positions into a Telegram chat.
//!
//! The relay subscribes to the OGN APRS-IS feed for a set of tracked
//! aircraft, keeps the latest position of each, and periodically publishes
//! them to a chat as live location markers with a companion detail text.
//!
//! # Architecture
//!
//! ```text
//!  Telegram ──updates──► bot::run_intake ──► bot::CommandDispatcher
//!                                                   │
//!                                                   ▼
//!                                           tracker::Tracker
//!                     ┌─────────────────────────┼──────────────────────┐
//!                     ▼                         ▼                      ▼
//!          feed::IngestionLoop      tracking::TrackingStore   broadcast::BroadcastCycle
//!          (APRS-IS lines → fold)     (shared state)          (store → chat messages)
//! ```
//!
//! ```ignore
//! use std::sync::Arc;
//! use glidertrack::chat::TelegramClient;
//! use glidertrack::feed::{AprsClient, AprsDecoder};
//! use glidertrack::tracker::Tracker;
//!
//! let transport = Arc::new(TelegramClient::new(config.telegram.to_telegram_config(token))?);
//! let feed = Arc::new(AprsClient::new(config.feed.to_feed_config()));
//! let tracker = Arc::new(Tracker::new(feed, Arc::new(AprsDecoder::new()), transport, config.to_tracker_config()));
//! ```

pub mod bot;
pub mod broadcast;
pub mod chat;
pub mod config;
pub mod coord;
pub mod feed;
pub mod ident;
pub mod logging;
pub mod tracker;
pub mod tracking;

/// Version of the glidertrack library and CLI.
///
/// Synchronized across the workspace; also sent in the APRS-IS login line.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
