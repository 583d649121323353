//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use glidertrack::chat::TransportError;
use glidertrack::config::{config_file_path, ConfigFileError, TOKEN_ENV_VAR};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be read, parsed or written
    Config(ConfigFileError),
    /// No bot token in the environment or the config file
    MissingToken,
    /// Failed to set up the Telegram client
    Transport(TransportError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to install the Ctrl+C handler
    Signal(String),
    /// Config file exists and `--force` was not given
    ConfigExists(PathBuf),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::MissingToken => {
                eprintln!();
                eprintln!("Provide the bot token from @BotFather in one of these ways:");
                eprintln!("  1. export {}=<token>", TOKEN_ENV_VAR);
                eprintln!(
                    "  2. set 'token' under [telegram] in {}",
                    config_file_path().display()
                );
                eprintln!("Run 'glidertrack init' to create the config file.");
            }
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or delete the key to use the default.");
                eprintln!("Run 'glidertrack config path' to locate the file.");
            }
            CliError::ConfigExists(_) => {
                eprintln!();
                eprintln!("Use 'glidertrack init --force' to overwrite it with defaults.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::MissingToken => write!(f, "No Telegram bot token configured"),
            CliError::Transport(e) => write!(f, "Failed to create Telegram client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Signal(msg) => write!(f, "Failed to set signal handler: {}", msg),
            CliError::ConfigExists(path) => {
                write!(f, "Configuration file already exists: {}", path.display())
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Transport(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Transport(e)
    }
}
