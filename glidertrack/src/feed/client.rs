//! Feed client trait and APRS-IS implementation.
//!
//! The [`FeedClient`] trait is the only view the tracking core has of the
//! feed: a filter to apply on the next connection, a blocking `run` that
//! streams lines to a callback, and a `disconnect` control that makes the
//! current (or next) `run` return.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::config::FeedConfig;
use super::error::FeedError;

/// Time allowed to establish the TCP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// A connection that delivers nothing for this long is considered dead.
/// APRS-IS servers emit a comment line roughly every 20 seconds.
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest accepted line. APRS-IS packets are at most 512 bytes.
const MAX_LINE_LEN: u64 = 2048;

/// Streaming position feed.
pub trait FeedClient: Send + Sync {
    /// Set the subscription filter used by the next connection.
    fn set_filter(&self, filter: String);

    /// Filter the next connection will use.
    fn filter(&self) -> String;

    /// Connect and deliver every received line to `on_line` until the
    /// connection fails or [`disconnect`](FeedClient::disconnect) is called.
    ///
    /// Returns `Ok(())` after a requested disconnect.
    fn run<F>(&self, on_line: F) -> impl Future<Output = Result<(), FeedError>> + Send
    where
        F: FnMut(&str) + Send;

    /// Ask the running connection to close. If no connection is running, the
    /// next `run` returns immediately.
    fn disconnect(&self);
}

/// APRS-IS client over TCP.
pub struct AprsClient {
    config: FeedConfig,
    filter: Mutex<String>,
    stop: Notify,
}

impl AprsClient {
    /// Create a client; nothing connects until [`FeedClient::run`].
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            filter: Mutex::new(String::new()),
            stop: Notify::new(),
        }
    }

    async fn connect(&self) -> Result<TcpStream, FeedError> {
        let addr = self.config.address();
        match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(FeedError::Connect {
                addr,
                reason: e.to_string(),
            }),
            Err(_) => Err(FeedError::Connect {
                addr,
                reason: format!("timed out after {}s", CONNECT_TIMEOUT.as_secs()),
            }),
        }
    }
}

/// Build the APRS-IS login line, including the trailing CRLF.
pub fn login_line(callsign: &str, passcode: &str, filter: &str) -> String {
    let mut line = format!(
        "user {} pass {} vers glidertrack {}",
        callsign,
        passcode,
        crate::VERSION
    );
    if !filter.is_empty() {
        line.push_str(" filter ");
        line.push_str(filter);
    }
    line.push_str("\r\n");
    line
}

impl FeedClient for AprsClient {
    fn set_filter(&self, filter: String) {
        *self.filter.lock() = filter;
    }

    fn filter(&self) -> String {
        self.filter.lock().clone()
    }

    async fn run<F>(&self, mut on_line: F) -> Result<(), FeedError>
    where
        F: FnMut(&str) + Send,
    {
        let stream = tokio::select! {
            _ = self.stop.notified() => {
                tracing::debug!("Disconnect requested before connecting");
                return Ok(());
            }
            stream = self.connect() => stream?,
        };

        let filter = self.filter();
        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(login_line(&self.config.callsign, &self.config.passcode, &filter).as_bytes())
            .await?;

        tracing::info!(
            server = %self.config.address(),
            filter = %filter,
            "Connected to feed"
        );

        let mut reader = BufReader::new(read_half);
        let mut buf = Vec::with_capacity(512);
        let mut keepalive =
            tokio::time::interval_at(Instant::now() + self.config.keepalive, self.config.keepalive);
        let mut last_activity = Instant::now();

        loop {
            let mut line_reader = (&mut reader).take(MAX_LINE_LEN - buf.len() as u64);
            tokio::select! {
                _ = self.stop.notified() => {
                    tracing::info!("Feed disconnect requested");
                    return Ok(());
                }
                _ = keepalive.tick() => {
                    write_half.write_all(b"# glidertrack keepalive\r\n").await?;
                    tracing::trace!("Keepalive sent");
                }
                _ = tokio::time::sleep_until(last_activity + IDLE_TIMEOUT) => {
                    return Err(FeedError::Idle(IDLE_TIMEOUT.as_secs()));
                }
                // read_until keeps partial data in `buf` if another branch wins
                read = line_reader.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        return Err(FeedError::Closed);
                    }
                    if buf.last() != Some(&b'\n') && buf.len() as u64 >= MAX_LINE_LEN {
                        return Err(FeedError::LineTooLong(MAX_LINE_LEN));
                    }
                    last_activity = Instant::now();
                    {
                        let text = String::from_utf8_lossy(&buf);
                        let line = text.trim_end_matches(['\r', '\n']);
                        if !line.is_empty() {
                            on_line(line);
                        }
                    }
                    buf.clear();
                }
            }
        }
    }

    fn disconnect(&self) {
        self.stop.notify_one();
    }
}
