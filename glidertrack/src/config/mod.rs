//! Configuration for glidertrack.
//!
//! The configuration lives in `~/.glidertrack/config.ini`:
//!
//! ```ini
//! [telegram]
//! token = 123456:ABC...
//!
//! [feed]
//! callsign = N0CALL
//!
//! [broadcast]
//! interval = 30
//! policy = edit
//! ```
//!
//! Missing keys fall back to the defaults in [`defaults`]. Runtime configs
//! for the components are derived with the `to_*_config` helpers on
//! [`ConfigFile`] and its sections.

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BroadcastSettings, ConfigFile, FeedSettings, LandingSettings, LoggingSettings,
    TelegramSettings,
};
