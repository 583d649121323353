//! Error types for the position feed.

use thiserror::Error;

/// Errors that end a feed connection.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Could not connect to the server.
    #[error("Failed to connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    /// Read or write on an established connection failed.
    #[error("Feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection.
    #[error("Connection closed by server")]
    Closed,

    /// Nothing was received for too long.
    #[error("No data received for {0} seconds")]
    Idle(u64),

    /// A line grew past the size limit without a terminating newline.
    #[error("Line exceeds {0} bytes")]
    LineTooLong(u64),
}

/// Reasons a single feed line did not yield a beacon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Blank line.
    #[error("Empty line")]
    Empty,

    /// Server comment (`# ...`), e.g. the login banner or keepalives.
    #[error("Server comment")]
    ServerComment,

    /// APRS data type that does not carry a position report.
    #[error("Unsupported data type '{0}'")]
    UnsupportedType(char),

    /// The line looked like a position report but could not be parsed.
    #[error("Malformed line: {0}")]
    Malformed(String),
}
