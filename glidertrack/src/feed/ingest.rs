//! Feed ingestion loop.
//!
//! Runs while tracking is enabled: keeps a connection to the feed, decodes
//! every line and folds matching beacons into the store. Connection errors
//! are retried after a fixed backoff for as long as tracking stays enabled.
//!
//! Follows the adapter pattern used elsewhere in the crate:
//! - `new()` + `start()` → spawns async task
//! - `run()` loop that polls the enabled flag at the top of each iteration

use std::sync::Arc;
use std::time::Duration;

use super::client::FeedClient;
use super::error::DecodeError;
use super::parser::BeaconDecoder;
use crate::tracking::TrackingStore;

/// Feed ingestion daemon.
pub struct IngestionLoop<F: FeedClient, D: BeaconDecoder> {
    store: Arc<TrackingStore>,
    client: Arc<F>,
    decoder: Arc<D>,
    backoff: Duration,
}

impl<F, D> IngestionLoop<F, D>
where
    F: FeedClient + 'static,
    D: BeaconDecoder + 'static,
{
    pub fn new(
        store: Arc<TrackingStore>,
        client: Arc<F>,
        decoder: Arc<D>,
        backoff: Duration,
    ) -> Self {
        Self {
            store,
            client,
            decoder,
            backoff,
        }
    }

    /// Start the loop as an async task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run until tracking is disabled.
    pub async fn run(self) {
        tracing::info!(
            backoff_secs = self.backoff.as_secs(),
            "Feed ingestion started"
        );

        loop {
            if !self.store.is_enabled() {
                break;
            }

            let result = self
                .client
                .run(|line| {
                    ingest_line(&self.store, self.decoder.as_ref(), line);
                })
                .await;

            match result {
                Ok(()) => tracing::debug!("Feed connection closed on request"),
                Err(e) => {
                    if !self.store.is_enabled() {
                        break;
                    }
                    tracing::warn!(
                        error = %e,
                        backoff_secs = self.backoff.as_secs(),
                        "Feed connection failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }

        tracing::info!("Feed ingestion stopped");
    }
}

/// Decode one line and fold it into the store. Returns true if a tracked
/// entry was updated.
pub fn ingest_line<D: BeaconDecoder + ?Sized>(
    store: &TrackingStore,
    decoder: &D,
    line: &str,
) -> bool {
    match decoder.decode(line) {
        Ok(beacon) => {
            let source = beacon.source_id.clone();
            store.fold_beacon(&source, beacon)
        }
        Err(DecodeError::ServerComment) | Err(DecodeError::Empty) => {
            tracing::trace!(line, "Server comment");
            false
        }
        Err(e) => {
            tracing::debug!(error = %e, line, "Skipping undecodable line");
            false
        }
    }
}
