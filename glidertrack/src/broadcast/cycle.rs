//! The periodic broadcast task.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use super::render::compose_detail_text;
use super::{BroadcastConfig, HandleState};
use crate::chat::{ChatId, ChatTransport, TransportError};
use crate::coord::Coordinates;
use crate::tracking::{OutboundHandles, TrackingStore};

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// New message pairs sent.
    pub created: usize,
    /// Existing pairs edited in place.
    pub updated: usize,
    /// Stale pairs deleted and re-sent.
    pub replaced: usize,
    /// Entries without a position (or the whole tick without a chat target).
    pub skipped: usize,
    /// Entries whose transport calls failed.
    pub failed: usize,
}

/// Result of refreshing one entry.
enum EntryOutcome {
    Created,
    Updated,
    Replaced,
    Failed,
}

/// Broadcast daemon.
///
/// Holds no state of its own between ticks: everything it needs is in the
/// store snapshot, and the only thing it writes back is the outbound
/// message handles.
pub struct BroadcastCycle<T: ChatTransport> {
    store: Arc<TrackingStore>,
    transport: Arc<T>,
    config: BroadcastConfig,
}

impl<T: ChatTransport + 'static> BroadcastCycle<T> {
    pub fn new(store: Arc<TrackingStore>, transport: Arc<T>, config: BroadcastConfig) -> Self {
        Self {
            store,
            transport,
            config,
        }
    }

    /// Start the cycle as an async task.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Tick until tracking is disabled. The first tick fires one period
    /// after start.
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            policy = %self.config.policy,
            "Broadcast started"
        );

        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.interval,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !self.store.is_enabled() {
                break;
            }

            let report = self.run_once().await;
            tracing::debug!(
                created = report.created,
                updated = report.updated,
                replaced = report.replaced,
                skipped = report.skipped,
                failed = report.failed,
                "Broadcast tick complete"
            );
        }

        tracing::info!("Broadcast stopped");
    }

    /// Run a single tick.
    pub async fn run_once(&self) -> CycleReport {
        let snapshot = self.store.snapshot();
        let mut report = CycleReport::default();

        let Some(chat) = snapshot.chat_target else {
            tracing::debug!("No chat target yet, skipping broadcast");
            report.skipped = snapshot.entries.len();
            return report;
        };

        for entry in &snapshot.entries {
            let Some(beacon) = entry.last_position.as_ref() else {
                report.skipped += 1;
                continue;
            };

            let text = compose_detail_text(entry, snapshot.landing, Utc::now());
            let state =
                HandleState::classify(entry.outbound, self.config.policy, Instant::now());

            let outcome = match state {
                HandleState::Absent => {
                    self.create(chat, &entry.id, beacon.position, &text).await
                }
                HandleState::Editable(handles) => {
                    self.update(chat, &entry.id, handles, beacon.position, &text)
                        .await
                }
                HandleState::Stale(handles) => {
                    self.replace(chat, &entry.id, handles, beacon.position, &text)
                        .await
                }
            };

            match outcome {
                EntryOutcome::Created => report.created += 1,
                EntryOutcome::Updated => report.updated += 1,
                EntryOutcome::Replaced => report.replaced += 1,
                EntryOutcome::Failed => report.failed += 1,
            }
        }

        report
    }

    /// Send a fresh pair and record it.
    async fn create(
        &self,
        chat: ChatId,
        id: &str,
        position: Coordinates,
        text: &str,
    ) -> EntryOutcome {
        match self.send_pair(chat, id, position, text).await {
            Ok(handles) => {
                self.store.record_outbound_handles(id, Some(handles));
                tracing::info!(id, live = %handles.live, "Location sent");
                EntryOutcome::Created
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to send location");
                EntryOutcome::Failed
            }
        }
    }

    /// Edit an existing pair in place.
    async fn update(
        &self,
        chat: ChatId,
        id: &str,
        original: OutboundHandles,
        position: Coordinates,
        text: &str,
    ) -> EntryOutcome {
        let mut handles = original;
        let mut failed = false;

        match self
            .transport
            .edit_live_location(chat, handles.live, position)
            .await
        {
            Ok(()) | Err(TransportError::NotModified) => {}
            Err(TransportError::NotEditable) => {
                tracing::info!(id, "Live location no longer editable, will recreate");
                handles = handles.into_stale(Instant::now());
                failed = true;
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to edit location");
                failed = true;
            }
        }

        match handles.detail {
            Some(detail) => match self.transport.edit_text(chat, detail, text).await {
                Ok(()) | Err(TransportError::NotModified) => {}
                Err(TransportError::NotEditable) => {
                    // Deleted by someone else; re-send on the next tick
                    tracing::debug!(id, "Detail text gone, will re-send");
                    handles.detail = None;
                    failed = true;
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "Failed to edit detail text");
                    failed = true;
                }
            },
            None => match self.transport.send_text(chat, text).await {
                Ok(detail) => handles.detail = Some(detail),
                Err(e) => {
                    tracing::warn!(id, error = %e, "Failed to send detail text");
                    failed = true;
                }
            },
        }

        if handles != original {
            self.store.record_outbound_handles(id, Some(handles));
        }

        if failed {
            EntryOutcome::Failed
        } else {
            tracing::debug!(id, "Location updated");
            EntryOutcome::Updated
        }
    }

    /// Delete a stale pair and send a new one.
    async fn replace(
        &self,
        chat: ChatId,
        id: &str,
        stale: OutboundHandles,
        position: Coordinates,
        text: &str,
    ) -> EntryOutcome {
        let to_delete = std::iter::once(stale.live).chain(stale.detail);
        for handle in to_delete {
            if let Err(e) = self.transport.delete_message(chat, handle).await {
                // Expired markers often cannot be deleted any more
                tracing::debug!(id, handle = %handle, error = %e, "Failed to delete old message");
            }
        }

        match self.send_pair(chat, id, position, text).await {
            Ok(handles) => {
                self.store.record_outbound_handles(id, Some(handles));
                tracing::debug!(id, live = %handles.live, "Location replaced");
                EntryOutcome::Replaced
            }
            Err(e) => {
                self.store.record_outbound_handles(id, None);
                tracing::warn!(id, error = %e, "Failed to re-send location");
                EntryOutcome::Failed
            }
        }
    }

    /// Live marker first; a failed detail text leaves the pair without one.
    async fn send_pair(
        &self,
        chat: ChatId,
        id: &str,
        position: Coordinates,
        text: &str,
    ) -> Result<OutboundHandles, TransportError> {
        let live = self
            .transport
            .send_live_location(chat, position, self.config.live_period)
            .await?;
        let editable_until = Instant::now() + self.config.live_period;

        let detail = match self.transport.send_text(chat, text).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to send detail text");
                None
            }
        };

        Ok(OutboundHandles::new(live, detail, editable_until))
    }
}
