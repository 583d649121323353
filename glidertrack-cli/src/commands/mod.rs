//! CLI command implementations.
//!
//! - [`config`] - Configuration inspection (path)
//! - [`init`] - Configuration initialization
//! - [`run`] - Main command (run the relay)

pub mod config;
pub mod init;
pub mod run;
